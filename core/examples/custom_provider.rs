use async_trait::async_trait;
use reqroute_core::{
    Context, Error, OsEnv, ProvideCredential, ProvideCredentialChain, Result, SigningCredential,
};

// A credential loaded from the environment.
#[derive(Clone, Debug)]
struct ApiKey {
    key: String,
}

impl SigningCredential for ApiKey {
    fn is_valid(&self) -> bool {
        !self.key.is_empty()
    }
}

// Fails every time, the chain moves on to the next provider.
#[derive(Debug)]
struct UnreachableProvider;

#[async_trait]
impl ProvideCredential for UnreachableProvider {
    type Credential = ApiKey;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Err(Error::metadata_retrieval("metadata endpoint is unreachable"))
    }
}

#[derive(Debug)]
struct EnvProvider;

#[async_trait]
impl ProvideCredential for EnvProvider {
    type Credential = ApiKey;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(ctx.env_var("MY_API_KEY").map(|key| ApiKey { key }))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = Context::new().with_env(OsEnv);
    let chain = ProvideCredentialChain::new()
        .push(UnreachableProvider)
        .push(EnvProvider);

    match chain.provide_credential(&ctx).await? {
        Some(cred) if cred.is_valid() => println!("loaded api key of {} bytes", cred.key.len()),
        _ => println!("no api key found, set MY_API_KEY"),
    }
    Ok(())
}
