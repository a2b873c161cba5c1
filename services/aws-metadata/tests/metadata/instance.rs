use crate::{connection_error, init_context, response, timeout_error, ReplayHttpSend};
use bytes::Bytes;
use http::header::USER_AGENT;
use http::Method;
use pretty_assertions::assert_eq;
use reqroute_aws_metadata::{
    Config, Credentials, InstanceCredentialProvider, InstanceMetadataFetcher,
    AWS_EC2_METADATA_DISABLED, AWS_EC2_METADATA_SERVICE_ENDPOINT, AWS_IMDS_USE_IPV6,
};
use reqroute_core::{ErrorKind, ProvideCredential, Result};
use std::time::Duration;
use test_case::test_case;

const TOKEN_URL: &str = "http://169.254.169.254/latest/api/token";
const ROLE_URL: &str = "http://169.254.169.254/latest/meta-data/iam/security-credentials/";
const CREDENTIALS_URL: &str =
    "http://169.254.169.254/latest/meta-data/iam/security-credentials/role-name";

fn token() -> Result<http::Response<Bytes>> {
    response(200, "token")
}

fn role_name() -> Result<http::Response<Bytes>> {
    response(200, "role-name")
}

fn credentials() -> Result<http::Response<Bytes>> {
    response(
        200,
        r#"{
            "AccessKeyId": "spam",
            "SecretAccessKey": "eggs",
            "Token": "spam-token",
            "Expiration": "something"
        }"#,
    )
}

fn expected() -> Credentials {
    Credentials {
        access_key: "spam".to_string(),
        secret_key: "eggs".to_string(),
        token: "spam-token".to_string(),
        expiry_time: "something".to_string(),
        role_name: Some("role-name".to_string()),
    }
}

fn config(num_attempts: usize) -> Config {
    Config {
        num_attempts,
        user_agent: Some("my-user-agent".to_string()),
        ..Default::default()
    }
}

async fn retrieve(config: &Config, http: &ReplayHttpSend) -> Option<Credentials> {
    let ctx = init_context(http.clone(), &[]);
    InstanceMetadataFetcher::new(config)
        .expect("endpoint must be valid")
        .retrieve_iam_role_credentials(&ctx)
        .await
}

#[tokio::test]
async fn test_retrieve_credentials() {
    let http = ReplayHttpSend::new(vec![token(), role_name(), credentials()]);

    let cred = retrieve(&config(1), &http).await;
    assert_eq!(cred, Some(expected()));

    let requests = http.requests();
    let calls: Vec<_> = requests
        .iter()
        .map(|r| (r.method.clone(), r.uri.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Method::PUT, TOKEN_URL),
            (Method::GET, ROLE_URL),
            (Method::GET, CREDENTIALS_URL),
        ]
    );
    assert_eq!(
        requests[0].headers["x-aws-ec2-metadata-token-ttl-seconds"],
        "21600"
    );
    for req in &requests {
        assert_eq!(req.headers[USER_AGENT], "my-user-agent");
        assert_eq!(req.timeout, Some(Duration::from_secs(1)));
    }
    for req in &requests[1..] {
        assert_eq!(req.headers["x-aws-ec2-metadata-token"], "token");
    }
}

#[test_case("true" ; "lowercase")]
#[test_case("tRuE" ; "mixed case")]
#[tokio::test]
async fn test_disabled_by_env(value: &str) {
    let http = ReplayHttpSend::new(vec![token(), role_name(), credentials()]);
    let ctx = init_context(http.clone(), &[(AWS_EC2_METADATA_DISABLED, value)]);

    let cred = InstanceCredentialProvider::default()
        .provide_credential(&ctx)
        .await
        .expect("disabled metadata must not fail");
    assert_eq!(cred, None);
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_disabling_env_not_true() {
    let http = ReplayHttpSend::new(vec![token(), role_name(), credentials()]);
    let ctx = init_context(http.clone(), &[(AWS_EC2_METADATA_DISABLED, "false")]);

    let config = Config::default().from_env(&ctx);
    let cred = InstanceMetadataFetcher::with_base_url(&config, "https://example.com/")
        .expect("endpoint must be valid")
        .retrieve_iam_role_credentials(&ctx)
        .await;
    assert_eq!(cred, Some(expected()));
    assert_eq!(http.requests()[0].uri, "https://example.com/latest/api/token");
}

#[tokio::test]
async fn test_provider_uses_env_endpoint() {
    let http = ReplayHttpSend::new(vec![token(), role_name(), credentials()]);
    let ctx = init_context(
        http.clone(),
        &[(AWS_EC2_METADATA_SERVICE_ENDPOINT, "http://127.0.0.1:1338/")],
    );

    let cred = InstanceCredentialProvider::default()
        .provide_credential(&ctx)
        .await
        .expect("credentials must load");
    assert_eq!(cred, Some(expected()));
    assert_eq!(http.requests()[0].uri, "http://127.0.0.1:1338/latest/api/token");
}

#[tokio::test]
async fn test_provider_ipv6_endpoint() {
    let http = ReplayHttpSend::new(vec![token(), role_name(), credentials()]);
    let ctx = init_context(
        http.clone(),
        &[
            (AWS_IMDS_USE_IPV6, "true"),
            (AWS_EC2_METADATA_SERVICE_ENDPOINT, "http://[fd00:ec2::254]/"),
        ],
    );

    let cred = InstanceCredentialProvider::default()
        .provide_credential(&ctx)
        .await
        .expect("credentials must load");
    assert_eq!(cred, Some(expected()));
    assert_eq!(http.requests()[0].uri, "http://[fd00:ec2::254]/latest/api/token");
}

#[tokio::test]
async fn test_provider_invalid_endpoint() {
    let http = ReplayHttpSend::new(vec![]);
    let ctx = init_context(
        http.clone(),
        &[(AWS_EC2_METADATA_SERVICE_ENDPOINT, "not.a:valid:dom@in")],
    );

    let err = InstanceCredentialProvider::default()
        .provide_credential(&ctx)
        .await
        .expect_err("invalid endpoint must fail");
    assert_eq!(err.kind(), ErrorKind::EndpointConfigInvalid);
    assert!(http.requests().is_empty());
}

#[test_case(response(429, r#"{"message": "Slow down"}"#) ; "non 200")]
#[test_case(connection_error() ; "connection error")]
#[test_case(response(200, "") ; "empty body")]
#[tokio::test]
async fn test_role_name_is_retried(failure: Result<http::Response<Bytes>>) {
    let http = ReplayHttpSend::new(vec![token(), failure, role_name(), credentials()]);

    let cred = retrieve(&config(2), &http).await;
    assert_eq!(cred, Some(expected()));
    assert_eq!(http.requests().len(), 4);
}

#[test_case(response(429, r#"{"message": "Slow down"}"#) ; "non 200")]
#[test_case(connection_error() ; "connection error")]
#[test_case(response(200, "") ; "empty body")]
#[test_case(response(200, r#"{"AccessKey":"#) ; "invalid json")]
#[tokio::test]
async fn test_credentials_are_retried(failure: Result<http::Response<Bytes>>) {
    let http = ReplayHttpSend::new(vec![token(), role_name(), failure, credentials()]);

    let cred = retrieve(&config(2), &http).await;
    assert_eq!(cred, Some(expected()));
    assert_eq!(http.requests().len(), 4);
}

#[tokio::test]
async fn test_exhaust_retries_on_role_name() {
    let http = ReplayHttpSend::new(vec![token(), response(400, "")]);

    assert_eq!(retrieve(&config(1), &http).await, None);
    assert_eq!(http.requests().len(), 2);
}

#[tokio::test]
async fn test_exhaust_retries_on_credentials() {
    let http = ReplayHttpSend::new(vec![token(), role_name(), response(400, "")]);

    assert_eq!(retrieve(&config(1), &http).await, None);
    assert_eq!(http.requests().len(), 3);
}

#[tokio::test]
async fn test_missing_fields_are_not_retried() {
    let http = ReplayHttpSend::new(vec![
        token(),
        role_name(),
        response(
            200,
            r#"{"Code":"AssumeRoleUnauthorizedAccess","Message":"error"}"#,
        ),
        credentials(),
    ]);

    assert_eq!(retrieve(&config(2), &http).await, None);
    assert_eq!(http.requests().len(), 3);
}

#[test_case(response(404, "") ; "not found")]
#[test_case(response(403, "") ; "forbidden")]
#[test_case(response(405, "") ; "method not allowed")]
#[test_case(timeout_error() ; "read timeout")]
#[tokio::test]
async fn test_token_not_supported(failure: Result<http::Response<Bytes>>) {
    let http = ReplayHttpSend::new(vec![failure, role_name(), credentials()]);

    let cred = retrieve(&config(1), &http).await;
    assert_eq!(cred, Some(expected()));

    let requests = http.requests();
    assert_eq!(requests.len(), 3);
    for req in &requests[1..] {
        assert!(!req.headers.contains_key("x-aws-ec2-metadata-token"));
    }
}

#[tokio::test]
async fn test_token_exhausted_retries() {
    let http = ReplayHttpSend::new(vec![
        connection_error(),
        response(500, ""),
        role_name(),
        credentials(),
    ]);

    let cred = retrieve(&config(2), &http).await;
    assert_eq!(cred, Some(expected()));

    let requests = http.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[1].method, Method::PUT);
    for req in &requests[2..] {
        assert!(!req.headers.contains_key("x-aws-ec2-metadata-token"));
    }
}

#[tokio::test]
async fn test_token_bad_request_yields_no_credentials() {
    let http = ReplayHttpSend::new(vec![response(400, ""), role_name(), credentials()]);

    assert_eq!(retrieve(&config(3), &http).await, None);
    assert_eq!(http.requests().len(), 1);
}
