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

use crate::constants::{
    ACCELERATE_SKIPPED_OPERATIONS, DEFAULT_DNS_SUFFIX, S3_ACCELERATE_DUALSTACK_HOST,
    S3_ACCELERATE_HOST,
};
use crate::S3Request;
use log::debug;
use reqroute_core::{Error, Result};
use std::fmt::{self, Display};
use std::str::FromStr;

/// AddressingStyle decides where the bucket name goes in the request url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingStyle {
    /// Virtual-host style when the bucket is DNS compatible, path-style otherwise.
    Auto,
    /// Always `{bucket}.{host}/{key}`.
    Virtual,
    /// Always `{host}/{bucket}/{key}`.
    Path,
}

impl FromStr for AddressingStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(AddressingStyle::Auto),
            "virtual" => Ok(AddressingStyle::Virtual),
            "path" => Ok(AddressingStyle::Path),
            _ => Err(Error::endpoint_config_invalid(format!(
                "unknown addressing style '{s}', expected auto, virtual or path"
            ))),
        }
    }
}

impl Display for AddressingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressingStyle::Auto => f.write_str("auto"),
            AddressingStyle::Virtual => f.write_str("virtual"),
            AddressingStyle::Path => f.write_str("path"),
        }
    }
}

/// Check whether `bucket` can be used as the leading host label.
///
/// A compatible name is 3 to 63 characters of lowercase letters, digits and hyphens,
/// starting and ending with a letter or digit. Dotted names are only accepted without
/// TLS, since `a.b.s3.amazonaws.com` doesn't match the wildcard certificate.
pub fn is_dns_compatible(bucket: &str, tls: bool) -> bool {
    if !(3..=63).contains(&bucket.len()) {
        return false;
    }
    if !bucket.contains('.') {
        return is_valid_label(bucket);
    }
    if tls {
        return false;
    }

    let labels: Vec<&str> = bucket.split('.').collect();
    let looks_like_ip =
        labels.len() == 4 && labels.iter().all(|v| v.bytes().all(|b| b.is_ascii_digit()));
    !looks_like_ip && labels.iter().all(|v| is_valid_label(v))
}

fn is_valid_label(label: &str) -> bool {
    let bs = label.as_bytes();
    let (Some(first), Some(last)) = (bs.first(), bs.last()) else {
        return false;
    };

    let is_alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    is_alnum(first) && is_alnum(last) && bs.iter().all(|b| is_alnum(b) || *b == b'-')
}

/// Move the bucket from the first path segment into the host.
///
/// `https://s3.us-west-2.amazonaws.com/mybucket/key.txt` becomes
/// `https://mybucket.s3.us-west-2.amazonaws.com/key.txt`.
///
/// The first call records the original path as `auth_path`. A request that already has
/// an `auth_path`, or whose host already starts with the bucket, is left untouched, so
/// repeated calls never move a key segment into the host. Fails with
/// [`reqroute_core::ErrorKind::DnsNameInvalid`] when the bucket can't be a host label.
pub fn switch_to_virtual_host_style(req: &mut S3Request) -> Result<()> {
    if req.auth_path.is_some() {
        debug!("request is already virtual-host addressed, skip rewrite");
        return Ok(());
    }
    if req.is_location_request() {
        return Ok(());
    }

    let path = req.uri.path().to_string();
    if let Some(bucket) = leading_bucket(req) {
        debug!("bucket {bucket} already leads the host, skip rewrite");
        req.auth_path = Some(match path.as_str() {
            "/" | "" => format!("/{bucket}/"),
            _ => format!("/{bucket}{path}"),
        });
        return Ok(());
    }

    req.auth_path = Some(path.clone());

    let mut segments: Vec<&str> = path.split('/').collect();
    let bucket = match segments.get(1) {
        Some(v) if !v.is_empty() => v.to_string(),
        // ListBuckets and friends address the service root.
        _ => return Ok(()),
    };

    let tls = req.uri.scheme_str() == Some("https");
    if !is_dns_compatible(&bucket, tls) {
        return Err(
            Error::dns_name_invalid(format!("bucket name '{bucket}' is not DNS compatible"))
                .with_context(format!("uri: {}", req.uri)),
        );
    }

    if segments.len() == 2 {
        if let Some(auth_path) = req.auth_path.as_mut() {
            auth_path.push('/');
        }
    }
    segments.remove(1);
    let new_path = match segments.join("/") {
        v if v.is_empty() => "/".to_string(),
        v => v,
    };

    let authority = req
        .uri
        .authority()
        .map(|v| v.as_str().to_string())
        .ok_or_else(|| {
            Error::request_invalid("request uri has no authority")
                .with_context(format!("uri: {}", req.uri))
        })?;
    req.set_authority_and_path(&format!("{bucket}.{authority}"), &new_path)
}

/// Returns the bucket already used as the leading host label of `req`.
///
/// The signing bucket is authoritative when known. Otherwise the labels in front of the
/// last `s3` or `s3-*` service label are taken as the bucket.
fn leading_bucket(req: &S3Request) -> Option<String> {
    let host = req.host()?;
    if let Some(bucket) = req.context.signing_bucket() {
        return host
            .strip_prefix(bucket)
            .filter(|rest| rest.starts_with('.'))
            .map(|_| bucket.to_string());
    }

    let labels: Vec<&str> = host.split('.').collect();
    let service = labels
        .iter()
        .rposition(|v| *v == "s3" || v.starts_with("s3-"))?;
    (service > 0).then(|| labels[..service].join("."))
}

/// Point the request at the S3 Transfer Acceleration endpoint.
///
/// Operations that accelerate doesn't support are left alone. The bucket stays in the
/// path, callers follow up with [`switch_to_virtual_host_style`].
pub fn switch_host_s3_accelerate(
    req: &mut S3Request,
    operation: &str,
    dualstack: bool,
) -> Result<()> {
    if ACCELERATE_SKIPPED_OPERATIONS.contains(&operation) {
        debug!("operation {operation} doesn't support s3 accelerate, skip");
        return Ok(());
    }

    let host = if dualstack {
        S3_ACCELERATE_DUALSTACK_HOST
    } else {
        S3_ACCELERATE_HOST
    };
    let path = req.uri.path().to_string();
    req.set_authority_and_path(host, &path)
}

/// Returns the accelerate options when `endpoint_url` is an S3 Transfer Acceleration endpoint.
///
/// `Some(false)` for `s3-accelerate.amazonaws.com`, `Some(true)` for the dualstack variant.
pub fn parse_accelerate_endpoint(endpoint_url: &str) -> Option<bool> {
    let uri: http::Uri = endpoint_url.parse().ok()?;
    let host = uri.host()?;
    let labels = host.strip_suffix(DEFAULT_DNS_SUFFIX)?.strip_suffix('.')?;

    let mut labels = labels.split('.');
    if labels.next()? != "s3-accelerate" {
        return None;
    }
    let mut dualstack = false;
    for label in labels {
        match label {
            "dualstack" => dualstack = true,
            _ => return None,
        }
    }
    Some(dualstack)
}
