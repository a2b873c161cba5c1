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

use crate::constants::*;
use crate::credential::CredentialsDocument;
use crate::fetcher::{is_unbracketed_ipv6, is_valid_endpoint_url, Attempt};
use crate::{Config, Credentials, MetadataFetcher};
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use log::{debug, warn};
use reqroute_core::{Context, Error, ErrorKind, ProvideCredential, Result};

/// InstanceMetadataFetcher loads IAM role credentials from the EC2 instance metadata
/// service.
///
/// The flow is:
///
/// 1. `PUT latest/api/token` for a session token. Services without token support answer
///    403, 404 or 405 or time out, the flow then continues without a token.
/// 2. `GET latest/meta-data/iam/security-credentials/` for the role name.
/// 3. `GET latest/meta-data/iam/security-credentials/{role_name}` for the credentials.
///
/// Every failure ends in `None` so credential chains can fall through.
#[derive(Debug, Clone)]
pub struct InstanceMetadataFetcher {
    base_url: String,
    disabled: bool,
    fetcher: MetadataFetcher,
}

impl InstanceMetadataFetcher {
    /// Create a fetcher whose base url comes from `config`.
    ///
    /// `ec2_metadata_service_endpoint` wins, then the IPv6 endpoint if `imds_use_ipv6` is set,
    /// then `http://169.254.169.254/`.
    pub fn new(config: &Config) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create a fetcher that uses `base_url` regardless of `config`'s endpoint settings.
    pub fn with_base_url(config: &Config, base_url: impl Into<String>) -> Result<Self> {
        Self::build(config, Some(base_url.into()))
    }

    fn build(config: &Config, base_url: Option<String>) -> Result<Self> {
        let base_url = select_base_url(config, base_url);
        if !is_valid_endpoint_url(&base_url) {
            let hint = if is_unbracketed_ipv6(&base_url) {
                "hint: ipv6 endpoints must be enclosed in brackets, like http://[fd00:ec2::254]/"
            } else {
                "hint: use a dns name, an ipv4 or a bracketed ipv6 address"
            };
            return Err(Error::endpoint_config_invalid(format!(
                "invalid metadata endpoint '{base_url}'"
            ))
            .with_context(hint));
        }
        debug!("instance metadata endpoint: {base_url}");

        let mut fetcher = MetadataFetcher::new(config.timeout, config.num_attempts);
        if let Some(ua) = &config.user_agent {
            fetcher = fetcher.with_user_agent(ua);
        }

        Ok(Self {
            base_url,
            disabled: config.ec2_metadata_disabled,
            fetcher,
        })
    }

    /// The base url every metadata path is joined to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch credentials of the role attached to this instance.
    ///
    /// Returns `None` when metadata is disabled, the token request is rejected, attempts run
    /// out or the credentials document lacks a credential field.
    pub async fn retrieve_iam_role_credentials(&self, ctx: &Context) -> Option<Credentials> {
        if self.disabled {
            debug!("instance metadata is disabled, skipped");
            return None;
        }

        match self.fetch_credentials(ctx).await {
            Ok(cred) => cred,
            Err(err) => {
                debug!("failed to load credentials from instance metadata: {err}");
                None
            }
        }
    }

    async fn fetch_credentials(&self, ctx: &Context) -> Result<Option<Credentials>> {
        let token = self.fetch_metadata_token(ctx).await?;
        let role_name = self.get_iam_role(ctx, token.as_deref()).await?;
        let doc = self
            .get_credentials(ctx, token.as_deref(), &role_name)
            .await?;

        let summary = doc.error_summary();
        let cred = doc.into_credentials(Some(role_name));
        if cred.is_none() {
            debug!("instance metadata returned no credentials: {summary}");
        }
        Ok(cred)
    }

    async fn fetch_metadata_token(&self, ctx: &Context) -> Result<Option<String>> {
        let url = self.url(IMDS_TOKEN_PATH);
        let mut headers = self.fetcher.default_headers();
        headers.insert(
            X_AWS_EC2_METADATA_TOKEN_TTL_SECONDS,
            HeaderValue::from_static(IMDS_TOKEN_TTL_SECONDS),
        );

        let token = self
            .fetcher
            .fetch_with_retry(ctx, Method::PUT, &url, &headers, |resp| match resp {
                Err(err) if err.is_timeout() => Ok(Attempt::Done(None)),
                Err(err) => Ok(Attempt::Retry(format!("connection error: {err}"))),
                Ok(resp) => match resp.status() {
                    StatusCode::OK => match String::from_utf8(resp.into_body().to_vec()) {
                        Ok(token) => Ok(Attempt::Done(Some(token))),
                        Err(_) => Ok(Attempt::Retry("token is not valid utf-8".to_string())),
                    },
                    StatusCode::FORBIDDEN
                    | StatusCode::NOT_FOUND
                    | StatusCode::METHOD_NOT_ALLOWED => Ok(Attempt::Done(None)),
                    StatusCode::BAD_REQUEST => Err(Error::request_invalid(
                        "instance metadata rejected the token request",
                    )),
                    status => Ok(Attempt::Retry(format!(
                        "received non 200 response {status}"
                    ))),
                },
            })
            .await;

        match token {
            Err(err) if err.kind() == ErrorKind::MetadataRetrieval => {
                debug!("metadata token unavailable, continue without it: {err}");
                Ok(None)
            }
            Ok(None) => {
                debug!("metadata token is not supported, continue without it");
                Ok(None)
            }
            token => token,
        }
    }

    async fn get_iam_role(&self, ctx: &Context, token: Option<&str>) -> Result<String> {
        let url = self.url(IMDS_SECURITY_CREDENTIALS_PATH);
        let headers = self.headers(token)?;

        self.fetcher
            .fetch_with_retry(ctx, Method::GET, &url, &headers, |resp| {
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
                match String::from_utf8(resp.into_body().to_vec()) {
                    Ok(role) if !role.trim().is_empty() => {
                        Ok(Attempt::Done(role.trim().to_string()))
                    }
                    _ => Ok(Attempt::Retry("received empty role name".to_string())),
                }
            })
            .await
    }

    async fn get_credentials(
        &self,
        ctx: &Context,
        token: Option<&str>,
        role_name: &str,
    ) -> Result<CredentialsDocument> {
        let url = self.url(&format!("{IMDS_SECURITY_CREDENTIALS_PATH}{role_name}"));
        let headers = self.headers(token)?;

        self.fetcher
            .fetch_with_retry(ctx, Method::GET, &url, &headers, |resp| {
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
                match serde_json::from_slice::<CredentialsDocument>(resp.body()) {
                    Ok(doc) => Ok(Attempt::Done(doc)),
                    Err(_) => Ok(Attempt::Retry(
                        "unable to parse response as JSON".to_string(),
                    )),
                }
            })
            .await
    }

    fn headers(&self, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = self.fetcher.default_headers();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);
            headers.insert(X_AWS_EC2_METADATA_TOKEN, value);
        }
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

fn select_base_url(config: &Config, base_url: Option<String>) -> String {
    if let Some(url) = base_url {
        return url;
    }
    match config
        .ec2_metadata_service_endpoint
        .as_deref()
        .filter(|v| !v.is_empty())
    {
        Some(endpoint) => {
            if config.imds_use_ipv6 {
                warn!("both custom metadata endpoint and ipv6 mode are set, use {endpoint}");
            }
            endpoint.to_string()
        }
        None if config.imds_use_ipv6 => DEFAULT_IMDS_IPV6_ENDPOINT.to_string(),
        None => DEFAULT_IMDS_ENDPOINT.to_string(),
    }
}

/// InstanceCredentialProvider loads credentials with [`InstanceMetadataFetcher`].
///
/// The config is merged with env on every call.
#[derive(Debug, Clone, Default)]
pub struct InstanceCredentialProvider {
    config: Config,
}

impl InstanceCredentialProvider {
    /// Create a new `InstanceCredentialProvider`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for InstanceCredentialProvider {
    type Credential = Credentials;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = self.config.clone().from_env(ctx);
        let fetcher = InstanceMetadataFetcher::new(&config)?;
        Ok(fetcher.retrieve_iam_role_credentials(ctx).await)
    }
}
