use anyhow::Result;
use bytes::Bytes;
use reqroute::aws_s3::{
    ArnParamHandler, Config, EndpointRewriter, PartitionResolver, RegionCache, RegionRedirector,
    RequestContext, S3Request, S3Response, UnsignedHeadBucket,
};
use reqroute::{Context, DefaultContext};
use serde_json::{json, Map, Value};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let bucket = env::args().nth(1).unwrap_or_else(|| "my-bucket".to_string());
    let key = env::args().nth(2).unwrap_or_else(|| "my-object".to_string());

    let ctx_impl = DefaultContext::new();
    let ctx = Context::new()
        .with_http_send(ctx_impl.clone())
        .with_env(ctx_impl.clone())
        .with_sleep(ctx_impl);

    let config = Arc::new(Config::default().from_env(&ctx));
    let resolver = Arc::new(PartitionResolver);
    let rewriter = EndpointRewriter::new(config.clone(), resolver.clone());
    let region = config.region.clone().unwrap_or_else(|| "us-east-1".to_string());
    let redirector = RegionRedirector::new(
        resolver.clone(),
        Arc::new(UnsignedHeadBucket::new(resolver, region.clone())),
        Arc::new(RegionCache::new()),
    );

    // The bucket may be a bucket name or an access point ARN.
    let mut params: Map<String, Value> = Map::new();
    params.insert("Bucket".to_string(), json!(bucket));
    let mut req_ctx = RequestContext::default();
    ArnParamHandler::new().handle(&mut params, "HeadObject", &mut req_ctx)?;
    redirector.redirect_from_cache(&params, &mut req_ctx);

    let bucket = params["Bucket"].as_str().unwrap_or_default();
    let uri = format!("https://s3.{region}.amazonaws.com/{bucket}/{key}").parse()?;
    let mut req = S3Request::new(http::Method::HEAD, uri).with_context(req_ctx);
    rewriter.rewrite(&mut req, "HeadObject")?;

    loop {
        println!("HEAD {}", req.uri);
        let resp = ctx.http_send(req.clone().into_http(Bytes::new())).await?;
        println!("Response status: {}", resp.status());
        if resp.status().is_success() {
            return Ok(());
        }

        let resp = S3Response::from_http(&resp);
        match redirector
            .redirect_from_error(&ctx, &mut req, Some(&resp), "HeadObject")
            .await
        {
            Some(delay) => tokio::time::sleep(delay).await,
            None => return Ok(()),
        }
    }
}
