use crate::{connection_error, init_context, json, response, ReplayHttpSend};
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION};
use http::{HeaderMap, HeaderValue, Method};
use pretty_assertions::assert_eq;
use reqroute_aws_metadata::{
    ContainerCredentialProvider, ContainerMetadataFetcher, AWS_CONTAINER_AUTHORIZATION_TOKEN,
    AWS_CONTAINER_CREDENTIALS_FULL_URI, AWS_CONTAINER_CREDENTIALS_RELATIVE_URI,
};
use reqroute_core::{ErrorKind, ProvideCredential, Result};
use serde_json::json as body;
use std::time::Duration;
use test_case::test_case;

fn credentials_body() -> serde_json::Value {
    body!({
        "AccessKeyId": "a",
        "SecretAccessKey": "b",
        "Token": "c",
        "Expiration": "d"
    })
}

#[tokio::test]
async fn test_retrieve_uri() {
    let http = ReplayHttpSend::new(vec![json(credentials_body())]);
    let ctx = init_context(http.clone(), &[]);

    let value = ContainerMetadataFetcher::new()
        .retrieve_uri(&ctx, "/foo?id=1")
        .await
        .expect("metadata must be fetched");
    assert_eq!(value, credentials_body());

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].uri, "http://169.254.170.2/foo?id=1");
    assert_eq!(requests[0].headers.len(), 1);
    assert_eq!(requests[0].headers[ACCEPT], "application/json");
    assert_eq!(requests[0].timeout, Some(Duration::from_secs(2)));
}

#[tokio::test]
async fn test_extra_headers_are_merged() {
    let http = ReplayHttpSend::new(vec![json(body!({"foo": "bar"}))]);
    let ctx = init_context(http.clone(), &[]);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/not-json"));
    headers.insert("x-other-header", HeaderValue::from_static("foo"));

    ContainerMetadataFetcher::new()
        .retrieve_full_uri(&ctx, "http://localhost", Some(&headers))
        .await
        .expect("metadata must be fetched");

    assert_eq!(http.requests()[0].headers, headers);
}

#[tokio::test]
async fn test_retries_connection_error() {
    let http = ReplayHttpSend::new(vec![connection_error(), json(credentials_body())]);
    let ctx = init_context(http.clone(), &[]);

    let value = ContainerMetadataFetcher::new()
        .retrieve_uri(&ctx, "/foo?id=1")
        .await
        .expect("second attempt must succeed");
    assert_eq!(value, credentials_body());
    assert_eq!(http.requests().len(), 2);
}

#[tokio::test]
async fn test_succeeds_on_last_attempt() {
    let http = ReplayHttpSend::new(vec![
        connection_error(),
        response(500, "internal error"),
        json(credentials_body()),
    ]);
    let ctx = init_context(http.clone(), &[]);

    let value = ContainerMetadataFetcher::new()
        .retrieve_uri(&ctx, "/foo?id=1")
        .await
        .expect("third attempt must succeed");
    assert_eq!(value, credentials_body());
    assert_eq!(http.requests().len(), ContainerMetadataFetcher::RETRY_ATTEMPTS);
}

#[test_case(vec![connection_error(), connection_error(), connection_error()] ; "connection errors")]
#[test_case(
    vec![response(404, "Error not found"), response(404, "Error not found"), response(404, "Error not found")]
    ; "non 200 responses"
)]
#[test_case(
    vec![response(200, "Not JSON"), response(200, "Not JSON"), response(200, "Not JSON")]
    ; "non json responses"
)]
#[test_case(vec![response(200, ""), response(200, ""), response(200, "")] ; "empty responses")]
#[tokio::test]
async fn test_exhausted_retries(responses: Vec<Result<http::Response<Bytes>>>) {
    let http = ReplayHttpSend::new(responses);
    let ctx = init_context(http.clone(), &[]);

    let err = ContainerMetadataFetcher::new()
        .retrieve_uri(&ctx, "/foo?id=1")
        .await
        .expect_err("retries must be exhausted");

    assert_eq!(err.kind(), ErrorKind::MetadataRetrieval);
    assert!(!err.to_string().contains("Not JSON"));
    assert!(!err.to_string().contains("Error not found"));
    assert_eq!(http.requests().len(), ContainerMetadataFetcher::RETRY_ATTEMPTS);
}

#[test_case("http://169.254.170.2/foo?id=1" ; "fixed ip")]
#[test_case("http://localhost/foo" ; "localhost http")]
#[test_case("http://localhost:8000/foo" ; "localhost with port")]
#[test_case("https://localhost/foo" ; "localhost https")]
#[test_case("https://127.0.0.1/foo" ; "loopback")]
#[test_case("https://127.0.0.1:8080/foo" ; "loopback with port")]
#[tokio::test]
async fn test_allowed_full_uri(full_uri: &str) {
    let http = ReplayHttpSend::new(vec![json(body!({"foo": "bar"}))]);
    let ctx = init_context(http.clone(), &[]);

    let value = ContainerMetadataFetcher::new()
        .retrieve_full_uri(&ctx, full_uri, None)
        .await
        .expect("allowed host must be fetched");
    assert_eq!(value, body!({"foo": "bar"}));
    assert_eq!(http.requests()[0].uri, full_uri);
}

#[test_case("http://169.254.0.1/foo" ; "link local http")]
#[test_case("https://169.254.0.1/foo" ; "link local https")]
#[test_case("http://169.1.2.3/foo" ; "non link local")]
#[test_case("http://somewhere.com/foo" ; "external host")]
#[test_case("https://somewhere.com/foo" ; "external host https")]
#[tokio::test]
async fn test_disallowed_full_uri(full_uri: &str) {
    let http = ReplayHttpSend::new(vec![json(body!({"foo": "bar"}))]);
    let ctx = init_context(http.clone(), &[]);

    let err = ContainerMetadataFetcher::new()
        .retrieve_full_uri(&ctx, full_uri, None)
        .await
        .expect_err("host must be rejected");
    assert_eq!(err.kind(), ErrorKind::HostNotAllowed);
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_provider_relative_uri() {
    let http = ReplayHttpSend::new(vec![json(credentials_body())]);
    let ctx = init_context(
        http.clone(),
        &[(AWS_CONTAINER_CREDENTIALS_RELATIVE_URI, "/v2/credentials/abc")],
    );

    let cred = ContainerCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .expect("credentials must load")
        .expect("credentials must exist");
    assert_eq!(cred.access_key, "a");
    assert_eq!(cred.secret_key, "b");
    assert_eq!(cred.token, "c");
    assert_eq!(cred.expiry_time, "d");
    assert_eq!(cred.role_name, None);
    assert_eq!(http.requests()[0].uri, "http://169.254.170.2/v2/credentials/abc");
}

#[tokio::test]
async fn test_provider_full_uri_with_token() {
    let http = ReplayHttpSend::new(vec![json(credentials_body())]);
    let ctx = init_context(
        http.clone(),
        &[
            (AWS_CONTAINER_CREDENTIALS_FULL_URI, "http://127.0.0.1:1338/creds"),
            (AWS_CONTAINER_AUTHORIZATION_TOKEN, "Basic abc"),
        ],
    );

    let cred = ContainerCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .expect("credentials must load");
    assert!(cred.is_some());

    let requests = http.requests();
    assert_eq!(requests[0].uri, "http://127.0.0.1:1338/creds");
    assert_eq!(requests[0].headers[AUTHORIZATION], "Basic abc");
    assert_eq!(requests[0].headers[ACCEPT], "application/json");
}

#[tokio::test]
async fn test_provider_incomplete_credentials() {
    let http = ReplayHttpSend::new(vec![json(body!({
        "Code": "Throttled",
        "Message": "slow down"
    }))]);
    let ctx = init_context(http, &[(AWS_CONTAINER_CREDENTIALS_RELATIVE_URI, "/creds")]);

    let err = ContainerCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .expect_err("incomplete credentials must fail");
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(err.to_string().contains("Throttled"));
}
