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

use crate::constants::X_AMZ_BUCKET_REGION;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use log::debug;
use serde::Deserialize;

/// S3Error is the error document returned in the body of a failed S3 response.
///
/// Bodiless responses, as returned for `HEAD`, carry the status code as `code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct S3Error {
    /// Error code such as `PermanentRedirect` or `301`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Region the bucket lives in, sent with `AuthorizationHeaderMalformed`.
    pub region: Option<String>,
    /// Endpoint to use instead, sent with `PermanentRedirect`.
    pub endpoint: Option<String>,
    /// Bucket the error is about.
    pub bucket: Option<String>,
}

/// S3Response is a service response as seen by the region redirector.
#[derive(Debug, Clone, Default)]
pub struct S3Response {
    /// Status code, absent when the request never reached the service.
    pub status: Option<StatusCode>,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed error, absent for successful responses.
    pub error: Option<S3Error>,
}

impl S3Response {
    /// Build from a raw http response, parsing the XML error body of failed requests.
    pub fn from_http(resp: &http::Response<Bytes>) -> Self {
        let status = resp.status();
        let error = if status.is_success() {
            None
        } else {
            Some(parse_error(status, resp.body()))
        };

        Self {
            status: Some(status),
            headers: resp.headers().clone(),
            error,
        }
    }

    /// Error code of this response.
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|v| v.code.as_str())
    }

    /// Region from the `x-amz-bucket-region` header.
    pub fn bucket_region_header(&self) -> Option<&str> {
        self.headers
            .get(X_AMZ_BUCKET_REGION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }

    /// Region from the error body.
    pub fn error_region(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|v| v.region.as_deref())
            .filter(|v| !v.is_empty())
    }
}

fn parse_error(status: StatusCode, body: &[u8]) -> S3Error {
    let fallback = || S3Error {
        code: status.as_u16().to_string(),
        message: status.canonical_reason().unwrap_or_default().to_string(),
        ..Default::default()
    };

    if body.is_empty() {
        return fallback();
    }

    let content = String::from_utf8_lossy(body);
    match quick_xml::de::from_str::<S3Error>(&content) {
        Ok(err) if !err.code.is_empty() => err,
        Ok(_) => fallback(),
        Err(err) => {
            debug!("failed to parse s3 error response with status {status}: {err}");
            fallback()
        }
    }
}
