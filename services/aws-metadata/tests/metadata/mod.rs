mod container;
mod instance;
mod live;
