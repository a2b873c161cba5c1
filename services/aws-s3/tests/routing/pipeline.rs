use crate::{init_context, response, ReplayHttpSend};
use http::Method;
use pretty_assertions::assert_eq;
use reqroute_aws_s3::{
    partition_of, AddressingStyle, ArnParamHandler, Config, EndpointRewriter, PartitionResolver,
    RegionCache, RegionRedirector, RequestContext, S3Request, S3Response, UnsignedHeadBucket,
    AWS_REGION, AWS_S3_ADDRESSING_STYLE,
};
use reqroute_core::{Context, StaticEnv};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Everything a client keeps between requests.
struct Client {
    region: String,
    handler: ArnParamHandler,
    rewriter: EndpointRewriter,
    redirector: RegionRedirector,
}

impl Client {
    fn new(config: Config) -> Self {
        let region = config.region.clone().unwrap_or_else(|| "us-east-1".to_string());
        let resolver = Arc::new(PartitionResolver);
        Self {
            handler: ArnParamHandler::new(),
            rewriter: EndpointRewriter::new(Arc::new(config), resolver.clone()),
            redirector: RegionRedirector::new(
                resolver.clone(),
                Arc::new(UnsignedHeadBucket::new(resolver, region.clone())),
                Arc::new(RegionCache::new()),
            ),
            region,
        }
    }

    /// Build a path-style GetObject request and route it.
    fn get_object(&self, bucket: &str, key: &str) -> S3Request {
        let mut params: Map<String, Value> = Map::new();
        params.insert("Bucket".to_string(), json!(bucket));

        let mut ctx = RequestContext::default();
        self.handler
            .handle(&mut params, "GetObject", &mut ctx)
            .expect("bucket param must be valid");
        self.redirector.redirect_from_cache(&params, &mut ctx);

        let bucket = params["Bucket"].as_str().expect("bucket must be a string");
        let (_, dns_suffix) = partition_of(&self.region);
        let uri = format!("https://s3.{}.{dns_suffix}/{bucket}/{key}", self.region);
        let mut req = S3Request::new(Method::GET, uri.parse().expect("uri must be valid"))
            .with_context(ctx);

        self.redirector
            .set_request_url(&mut req)
            .expect("cached endpoint must be valid");
        self.rewriter
            .rewrite(&mut req, "GetObject")
            .expect("rewrite must succeed");
        req
    }
}

#[tokio::test]
async fn test_redirect_is_cached_for_later_requests() {
    let http = ReplayHttpSend::new(vec![response(
        200,
        &[("x-amz-bucket-region", "eu-central-1")],
        "",
    )]);
    let ctx = init_context(http.clone());
    let client = Client::new(Config {
        region: Some("us-west-2".to_string()),
        ..Default::default()
    });

    let mut req = client.get_object("mybucket", "key.txt");
    assert_eq!(
        req.uri.to_string(),
        "https://mybucket.s3.us-west-2.amazonaws.com/key.txt"
    );

    // S3 answers a GetObject sent to the wrong region without telling which one is right.
    let resp = S3Response::from_http(
        &response(
            301,
            &[],
            "<Error><Code>PermanentRedirect</Code><Message>wrong endpoint</Message></Error>",
        )
        .expect("response must be valid"),
    );
    let delay = client
        .redirector
        .redirect_from_error(&ctx, &mut req, Some(&resp), "GetObject")
        .await;

    assert_eq!(delay, Some(Duration::ZERO));
    assert_eq!(
        req.uri.to_string(),
        "https://mybucket.s3.eu-central-1.amazonaws.com/key.txt"
    );
    assert_eq!(
        http.requests(),
        vec![(
            Method::HEAD,
            "https://mybucket.s3.us-west-2.amazonaws.com/".to_string()
        )]
    );

    // The next request to the bucket goes straight to the right region.
    let req = client.get_object("mybucket", "other.txt");
    assert_eq!(
        req.uri.to_string(),
        "https://mybucket.s3.eu-central-1.amazonaws.com/other.txt"
    );
    assert_eq!(
        req.context.signing.and_then(|v| v.region).as_deref(),
        Some("eu-central-1")
    );
    assert_eq!(http.requests().len(), 1);
}

#[tokio::test]
async fn test_access_point_requests_are_never_redirected() {
    let http = ReplayHttpSend::default();
    let ctx = init_context(http.clone());
    let client = Client::new(Config {
        region: Some("us-west-2".to_string()),
        ..Default::default()
    });

    let mut req = client.get_object(
        "arn:aws:s3:us-west-2:123456789012:accesspoint/myendpoint",
        "key.txt",
    );
    assert_eq!(
        req.uri.to_string(),
        "https://myendpoint-123456789012.s3-accesspoint.us-west-2.amazonaws.com/key.txt"
    );

    let resp = S3Response::from_http(
        &response(
            301,
            &[("x-amz-bucket-region", "eu-central-1")],
            "<Error><Code>PermanentRedirect</Code></Error>",
        )
        .expect("response must be valid"),
    );
    let delay = client
        .redirector
        .redirect_from_error(&ctx, &mut req, Some(&resp), "GetObject")
        .await;

    assert_eq!(delay, None);
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_region_lookup_stays_in_client_partition() {
    let http = ReplayHttpSend::new(vec![response(
        403,
        &[("x-amz-bucket-region", "cn-northwest-1")],
        "",
    )]);
    let ctx = init_context(http.clone());
    let client = Client::new(Config {
        region: Some("cn-north-1".to_string()),
        ..Default::default()
    });

    let mut req = client.get_object("mybucket", "key.txt");
    assert_eq!(
        req.uri.to_string(),
        "https://mybucket.s3.cn-north-1.amazonaws.com.cn/key.txt"
    );

    let resp = S3Response::from_http(
        &response(301, &[], "<Error><Code>PermanentRedirect</Code></Error>")
            .expect("response must be valid"),
    );
    let delay = client
        .redirector
        .redirect_from_error(&ctx, &mut req, Some(&resp), "GetObject")
        .await;

    assert_eq!(delay, Some(Duration::ZERO));
    assert_eq!(
        http.requests(),
        vec![(
            Method::HEAD,
            "https://mybucket.s3.cn-north-1.amazonaws.com.cn/".to_string()
        )]
    );
    assert_eq!(
        req.uri.to_string(),
        "https://mybucket.s3.cn-northwest-1.amazonaws.com.cn/key.txt"
    );
}

#[test]
fn test_config_from_public_env_names() {
    let ctx = Context::new().with_env(StaticEnv {
        envs: HashMap::from_iter([
            (AWS_REGION.to_string(), "eu-west-1".to_string()),
            (AWS_S3_ADDRESSING_STYLE.to_string(), "path".to_string()),
        ]),
    });

    let config = Config::default().from_env(&ctx);
    assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.addressing_style, Some(AddressingStyle::Path));
}
