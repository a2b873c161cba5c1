use anyhow::Result;
use reqroute::aws_metadata::{
    Config, ContainerCredentialProvider, Credentials, InstanceCredentialProvider,
};
use reqroute::{Context, DefaultContext, ProvideCredential, ProvideCredentialChain};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx_impl = DefaultContext::new();
    let ctx = Context::new()
        .with_http_send(ctx_impl.clone())
        .with_env(ctx_impl.clone())
        .with_sleep(ctx_impl);

    let chain: ProvideCredentialChain<Credentials> = ProvideCredentialChain::new()
        .push(ContainerCredentialProvider::new())
        .push(InstanceCredentialProvider::new(Config::default()));

    match chain.provide_credential(&ctx).await? {
        Some(cred) => println!("Loaded credentials: {cred:?}"),
        None => println!("No credentials available"),
    }

    Ok(())
}
