// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::ALLOWED_HOSTS;
use bytes::Bytes;
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use log::debug;
use reqroute_core::{Context, Error, RequestTimeout, Result};
use serde_json::Value;
use std::net::Ipv6Addr;
use std::time::Duration;

/// Backoff between attempts never grows past this multiple of the sleep time.
const MAX_BACKOFF_FACTOR: u32 = 8;

/// What a response handler decided about one attempt.
pub(crate) enum Attempt<T> {
    /// Stop retrying and return the value.
    Done(T),
    /// Try again, the message describes why.
    Retry(String),
}

/// MetadataFetcher sends bounded, retried requests to a local metadata endpoint.
///
/// Every request carries a [`RequestTimeout`], waits between attempts go through
/// [`Context::sleep`].
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    timeout: Duration,
    retry_attempts: usize,
    sleep_time: Duration,
    user_agent: Option<String>,
}

impl MetadataFetcher {
    /// Create a fetcher that makes at most `retry_attempts` attempts per call.
    pub fn new(timeout: Duration, retry_attempts: usize) -> Self {
        Self {
            timeout,
            retry_attempts: retry_attempts.max(1),
            sleep_time: Duration::from_secs(1),
            user_agent: None,
        }
    }

    /// Set the base wait between attempts.
    pub fn with_sleep_time(mut self, sleep_time: Duration) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    /// Send `User-Agent` with every request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Number of attempts made per call.
    pub fn retry_attempts(&self) -> usize {
        self.retry_attempts
    }

    /// GET `uri` and parse the body as JSON.
    ///
    /// The host must be one of the allowed metadata hosts, otherwise this fails with
    /// [`reqroute_core::ErrorKind::HostNotAllowed`] before any request is sent. Connection
    /// errors, non-200 statuses and empty or non-JSON bodies are retried. Headers passed in
    /// override the defaults.
    pub async fn get_response(
        &self,
        ctx: &Context,
        uri: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Value> {
        if !is_allowed_host(uri) {
            return Err(
                Error::host_not_allowed(format!("unsupported host in '{uri}'"))
                    .with_context(format!("allowed hosts: {}", ALLOWED_HOSTS.join(", "))),
            );
        }

        let mut merged = self.default_headers();
        merged.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(headers) = headers {
            for (k, v) in headers {
                merged.insert(k.clone(), v.clone());
            }
        }

        self.fetch_with_retry(ctx, Method::GET, uri, &merged, |resp| {
            let resp = match resp {
                Ok(resp) => resp,
                Err(err) => return Ok(Attempt::Retry(format!("connection error: {err}"))),
            };
            if resp.status() != StatusCode::OK {
                return Ok(Attempt::Retry(format!(
                    "received non 200 response {}",
                    resp.status()
                )));
            }
            if resp.body().is_empty() {
                return Ok(Attempt::Retry("received empty response".to_string()));
            }
            match serde_json::from_slice::<Value>(resp.body()) {
                Ok(v) => Ok(Attempt::Done(v)),
                Err(_) => Ok(Attempt::Retry(
                    "unable to parse response as JSON".to_string(),
                )),
            }
        })
        .await
    }

    /// Headers sent with every request.
    pub(crate) fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ua) = self.user_agent.as_deref() {
            if let Ok(v) = HeaderValue::from_str(ua) {
                headers.insert(USER_AGENT, v);
            }
        }
        headers
    }

    /// Send the request until `handle` accepts an outcome or attempts run out.
    ///
    /// `handle` sees every outcome, including transport errors, and may abort the loop by
    /// returning an error. Exhausting attempts fails with
    /// [`reqroute_core::ErrorKind::MetadataRetrieval`] carrying the last retry reason.
    pub(crate) async fn fetch_with_retry<T, F>(
        &self,
        ctx: &Context,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        mut handle: F,
    ) -> Result<T>
    where
        F: FnMut(Result<http::Response<Bytes>>) -> Result<Attempt<T>>,
    {
        let mut last = String::new();
        for attempt in 0..self.retry_attempts {
            let mut req = http::Request::builder()
                .method(method.clone())
                .uri(url)
                .body(Bytes::new())
                .map_err(|e| {
                    Error::request_invalid("failed to build metadata request")
                        .with_source(e)
                        .with_context(format!("url: {url}"))
                })?;
            req.headers_mut().extend(headers.clone());
            req.extensions_mut().insert(RequestTimeout(self.timeout));

            match handle(ctx.http_send(req).await)? {
                Attempt::Done(v) => return Ok(v),
                Attempt::Retry(reason) => {
                    debug!(
                        "metadata request to {url} failed on attempt {}: {reason}",
                        attempt + 1
                    );
                    last = reason;
                }
            }

            if attempt + 1 < self.retry_attempts {
                ctx.sleep(self.backoff(attempt)).await;
            }
        }

        Err(Error::metadata_retrieval(last).with_context(format!("url: {url}")))
    }

    /// Wait after the `attempt`-th failure, counting from zero.
    fn backoff(&self, attempt: usize) -> Duration {
        let factor = 1u32
            .checked_shl(attempt as u32)
            .unwrap_or(u32::MAX)
            .min(MAX_BACKOFF_FACTOR);
        self.sleep_time * factor
    }
}

/// Returns the authority of `url` without userinfo.
fn authority_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    Some(
        authority
            .rsplit_once('@')
            .map_or(authority, |(_, host)| host),
    )
}

/// Returns true if `url` carries an IPv6 literal without the surrounding brackets.
pub(crate) fn is_unbracketed_ipv6(url: &str) -> bool {
    authority_of(url)
        .is_some_and(|authority| !authority.starts_with('[') && authority.matches(':').count() > 1)
}

/// Split `url` into its host, keeping brackets around IPv6 literals.
fn host_of(url: &str) -> Option<&str> {
    let authority = authority_of(url)?;

    if authority.starts_with('[') {
        let end = authority.find(']')?;
        let host = &authority[..=end];
        match &authority[end + 1..] {
            "" => Some(host),
            rest => rest
                .strip_prefix(':')
                .filter(|port| is_port(port))
                .map(|_| host),
        }
    } else {
        match authority.split_once(':') {
            Some((host, port)) if is_port(port) => Some(host),
            Some(_) => None,
            None => Some(authority),
        }
    }
}

fn is_port(v: &str) -> bool {
    !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit())
}

/// Remove the zone id from a bracketed IPv6 literal.
fn strip_zone(host: &str) -> String {
    match (host.starts_with('['), host.find('%')) {
        (true, Some(idx)) => format!("{}]", &host[..idx]),
        _ => host.to_string(),
    }
}

/// Check if `url` points at one of the allowed metadata hosts, any scheme or port.
pub fn is_allowed_host(url: &str) -> bool {
    let Some(host) = host_of(url) else {
        return false;
    };
    let host = strip_zone(&host.to_ascii_lowercase());
    ALLOWED_HOSTS.contains(&host.as_str())
}

/// Check if `url` is a usable metadata endpoint: `http` or `https` with a DNS hostname, an
/// IPv4 address or a bracketed IPv6 literal with an optional zone id.
pub fn is_valid_endpoint_url(url: &str) -> bool {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return false;
    }
    if url.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let Some(host) = host_of(url) else {
        return false;
    };

    if let Some(literal) = host.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        let (addr, zone) = match literal.split_once('%') {
            Some((addr, zone)) => (addr, Some(zone)),
            None => (literal, None),
        };
        if zone.is_some_and(|zone| zone.is_empty()) {
            return false;
        }
        return addr.parse::<Ipv6Addr>().is_ok();
    }

    is_valid_hostname(host)
}

fn is_valid_hostname(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty() || host.len() > 255 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}
