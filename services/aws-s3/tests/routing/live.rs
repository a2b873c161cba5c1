use http::StatusCode;
use log::{debug, warn};
use reqroute_aws_s3::{HeadBucket, PartitionResolver, UnsignedHeadBucket};
use reqroute_core::Context;
use reqroute_http_send_reqwest::ReqwestHttpSend;
use std::env;
use std::sync::Arc;

#[tokio::test]
async fn test_unsigned_head_bucket() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("REQROUTE_AWS_S3_TEST").unwrap_or_default() != "on" {
        warn!("REQROUTE_AWS_S3_TEST is not set, skipped");
        return;
    }

    let bucket = env::var("REQROUTE_AWS_S3_BUCKET").expect("env REQROUTE_AWS_S3_BUCKET must set");
    let region = env::var("REQROUTE_AWS_S3_REGION").expect("env REQROUTE_AWS_S3_REGION must set");

    let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
    let resp = UnsignedHeadBucket::new(Arc::new(PartitionResolver), region.clone())
        .head_bucket(&ctx, &bucket)
        .await
        .expect("head bucket must reach s3");

    debug!("got response: {resp:?}");
    assert_ne!(resp.status, Some(StatusCode::NOT_FOUND));
    assert_eq!(resp.bucket_region_header(), Some(region.as_str()));
}
