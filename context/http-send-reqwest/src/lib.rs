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

//! [`HttpSend`] implementation backed by [`reqwest`].
//!
//! Timeouts, configured on the [`Client`] or per request with [`RequestTimeout`], surface as
//! [`reqroute_core::ErrorKind::Timeout`].

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqroute_core::{Error, HttpSend, RequestTimeout, Result};
use reqwest::{Client, Request};

/// HttpSend that executes requests with a [`reqwest::Client`].
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let timeout = req.extensions().get::<RequestTimeout>().map(|v| v.0);
        let mut req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to convert http request").with_source(e)
        })?;
        if timeout.is_some() {
            *req.timeout_mut() = timeout;
        }
        let resp: http::Response<_> = self.client.execute(req).await.map_err(map_error)?.into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(map_error)?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

fn map_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return Error::timeout("http request timed out").with_source(err);
    }

    let retryable = err.is_connect() || err.is_request() || err.is_body();
    Error::unexpected("failed to send http request")
        .with_source(err)
        .set_retryable(retryable)
}
