use log::{debug, warn};
use reqroute_aws_metadata::{Config, InstanceMetadataFetcher};
use reqroute_core::{Context, OsEnv};
use reqroute_http_send_reqwest::ReqwestHttpSend;
use reqroute_sleep_tokio::TokioSleep;
use std::env;

#[tokio::test]
async fn test_instance_metadata() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("REQROUTE_AWS_METADATA_TEST_IMDS").unwrap_or_default() != "on" {
        warn!("REQROUTE_AWS_METADATA_TEST_IMDS is not set, skipped");
        return;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_sleep(TokioSleep)
        .with_env(OsEnv);
    let config = Config {
        num_attempts: 3,
        ..Default::default()
    }
    .from_env(&ctx);

    let cred = InstanceMetadataFetcher::new(&config)
        .expect("endpoint must be valid")
        .retrieve_iam_role_credentials(&ctx)
        .await
        .expect("credentials must be served on an instance with a role");

    debug!("got credentials: {cred:?}");
    assert!(!cred.access_key.is_empty());
    assert!(!cred.secret_key.is_empty());
    assert!(cred.role_name.is_some());
}
