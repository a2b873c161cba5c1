mod live;
mod pipeline;
