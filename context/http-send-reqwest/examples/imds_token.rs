use anyhow::Result;
use bytes::Bytes;
use reqroute_core::{Context, RequestTimeout};
use reqroute_http_send_reqwest::ReqwestHttpSend;
use reqwest::Client;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let client = Client::builder()
        .user_agent("reqroute-example/0.1")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let mut req = http::Request::builder()
        .method(http::Method::PUT)
        .uri("http://169.254.169.254/latest/api/token")
        .header("x-aws-ec2-metadata-token-ttl-seconds", "21600")
        .body(Bytes::new())?;
    // IMDS answers in milliseconds on EC2, anywhere else the connect hangs.
    req.extensions_mut()
        .insert(RequestTimeout(Duration::from_secs(1)));

    match ctx.http_send(req).await {
        Ok(resp) => println!("token endpoint answered with {}", resp.status()),
        Err(e) if e.is_timeout() => println!("not running on EC2: {e}"),
        Err(e) => eprintln!("token request failed: {e}"),
    }

    Ok(())
}
