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
use crate::{Credentials, MetadataFetcher};
use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use log::debug;
use reqroute_core::{Context, Error, ProvideCredential, Result};
use serde_json::Value;
use std::time::Duration;

/// ContainerMetadataFetcher reads the container credentials endpoint.
///
/// Relative URIs always go to [`ContainerMetadataFetcher::IP_ADDRESS`], full URIs must point
/// at an allowed metadata host.
#[derive(Debug, Clone)]
pub struct ContainerMetadataFetcher {
    fetcher: MetadataFetcher,
}

impl Default for ContainerMetadataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerMetadataFetcher {
    /// Attempts made per call.
    pub const RETRY_ATTEMPTS: usize = 3;
    /// Base wait between attempts.
    pub const SLEEP_TIME: Duration = Duration::from_secs(1);
    /// Timeout of every request.
    pub const TIMEOUT: Duration = Duration::from_secs(2);
    /// Host serving relative URIs.
    pub const IP_ADDRESS: &'static str = CONTAINER_IP_ADDRESS;

    /// Create a new `ContainerMetadataFetcher`.
    pub fn new() -> Self {
        Self {
            fetcher: MetadataFetcher::new(Self::TIMEOUT, Self::RETRY_ATTEMPTS)
                .with_sleep_time(Self::SLEEP_TIME),
        }
    }

    /// Fetch `relative_uri` from the container endpoint.
    pub async fn retrieve_uri(&self, ctx: &Context, relative_uri: &str) -> Result<Value> {
        let full_url = Self::full_url(relative_uri);
        self.fetcher.get_response(ctx, &full_url, None).await
    }

    /// Fetch `full_uri`, which must point at an allowed host.
    pub async fn retrieve_full_uri(
        &self,
        ctx: &Context,
        full_uri: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Value> {
        self.fetcher.get_response(ctx, full_uri, headers).await
    }

    /// Build the url of `relative_uri` on the container endpoint.
    pub fn full_url(relative_uri: &str) -> String {
        format!("http://{}{relative_uri}", Self::IP_ADDRESS)
    }
}

/// ContainerCredentialProvider loads credentials from the container credentials endpoint.
///
/// - `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` is resolved against `169.254.170.2`.
/// - `AWS_CONTAINER_CREDENTIALS_FULL_URI` is used as is, with
///   `AWS_CONTAINER_AUTHORIZATION_TOKEN` as its `Authorization` header.
///
/// Returns `None` when neither is set.
#[derive(Debug, Clone, Default)]
pub struct ContainerCredentialProvider {
    fetcher: ContainerMetadataFetcher,
}

impl ContainerCredentialProvider {
    /// Create a new `ContainerCredentialProvider`.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProvideCredential for ContainerCredentialProvider {
    type Credential = Credentials;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let value = if let Some(relative) = ctx.env_var(AWS_CONTAINER_CREDENTIALS_RELATIVE_URI) {
            self.fetcher.retrieve_uri(ctx, &relative).await?
        } else if let Some(full) = ctx.env_var(AWS_CONTAINER_CREDENTIALS_FULL_URI) {
            let mut headers = HeaderMap::new();
            if let Some(token) = ctx.env_var(AWS_CONTAINER_AUTHORIZATION_TOKEN) {
                let mut value = HeaderValue::from_str(&token).map_err(|e| {
                    Error::request_invalid(format!(
                        "invalid {AWS_CONTAINER_AUTHORIZATION_TOKEN}"
                    ))
                    .with_source(e)
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            self.fetcher
                .retrieve_full_uri(ctx, &full, Some(&headers))
                .await?
        } else {
            debug!("container credentials env is not set, skipped");
            return Ok(None);
        };

        let doc: CredentialsDocument = serde_json::from_value(value)?;
        let summary = doc.error_summary();
        doc.into_credentials(None).map(Some).ok_or_else(|| {
            Error::unexpected("container credentials response is missing fields")
                .with_context(summary)
        })
    }
}
