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

use http::{HeaderMap, Method, Uri};
use reqroute_core::{Error, Result};

/// SigningContext is the endpoint, region and bucket a request must be signed for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningContext {
    /// Bucket the request targets.
    pub bucket: Option<String>,
    /// Region to sign for.
    pub region: Option<String>,
    /// Full endpoint url, for example `https://s3.eu-central-1.amazonaws.com`.
    pub endpoint: Option<String>,
    /// Service name to sign for when it differs from `s3`.
    pub signing_name: Option<String>,
}

/// AccessPointContext is derived from an access point or outpost ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointContext {
    /// Access point name.
    pub name: String,
    /// Account owning the access point.
    pub account: String,
    /// Region from the ARN.
    pub region: String,
    /// Partition from the ARN.
    pub partition: String,
    /// Service from the ARN, `s3` or `s3-outposts`.
    pub service: String,
    /// Outpost id for outpost access points.
    pub outpost_name: Option<String>,
}

/// RequestContext carries routing decisions for exactly one request/response exchange.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Signing context resolved from the cache or a redirect.
    pub signing: Option<SigningContext>,
    /// Access point parsed from an ARN bucket parameter.
    pub access_point: Option<AccessPointContext>,
    /// Set once the request has been redirected to another region.
    pub redirected: bool,
    /// Region the client was configured with.
    pub client_region: Option<String>,
}

impl RequestContext {
    /// Get the signing context, inserting an empty one if absent.
    pub fn signing_mut(&mut self) -> &mut SigningContext {
        self.signing.get_or_insert_with(SigningContext::default)
    }

    /// Bucket recorded in the signing context.
    pub fn signing_bucket(&self) -> Option<&str> {
        self.signing.as_ref().and_then(|v| v.bucket.as_deref())
    }
}

/// S3Request is the request value flowing through the routing pipeline.
#[derive(Debug, Clone)]
pub struct S3Request {
    /// HTTP method.
    pub method: Method,
    /// Target uri, always absolute.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Canonical resource path, computed once on the first virtual-host rewrite.
    pub auth_path: Option<String>,
    /// Per-request routing state.
    pub context: RequestContext,
}

impl S3Request {
    /// Create a new request with an empty context.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            auth_path: None,
            context: RequestContext::default(),
        }
    }

    /// Attach a request context.
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Split an http request into a routable request and its body.
    pub fn from_http<B>(req: http::Request<B>) -> (Self, B) {
        let (parts, body) = req.into_parts();
        let req = Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            auth_path: None,
            context: RequestContext::default(),
        };
        (req, body)
    }

    /// Build an http request with the routed method, uri and headers.
    pub fn into_http<B>(self, body: B) -> http::Request<B> {
        let mut req = http::Request::new(body);
        *req.method_mut() = self.method;
        *req.uri_mut() = self.uri;
        *req.headers_mut() = self.headers;
        req
    }

    /// Host of the target uri.
    pub fn host(&self) -> Option<&str> {
        self.uri.host()
    }

    /// Returns true if the uri targets a bucket's location sub-resource.
    pub fn is_location_request(&self) -> bool {
        self.uri.query() == Some("location")
    }

    /// Replace authority and path of the uri, keeping scheme and query.
    pub(crate) fn set_authority_and_path(&mut self, authority: &str, path: &str) -> Result<()> {
        self.uri = rebuild_uri(&self.uri, None, Some(authority), Some(path))?;
        Ok(())
    }
}

/// Rebuild `uri` replacing the given components and keeping the query.
pub(crate) fn rebuild_uri(
    uri: &Uri,
    scheme: Option<&str>,
    authority: Option<&str>,
    path: Option<&str>,
) -> Result<Uri> {
    let scheme = scheme.or(uri.scheme_str()).unwrap_or("https");
    let authority = match authority {
        Some(v) => v,
        None => uri.authority().map(|v| v.as_str()).ok_or_else(|| {
            Error::request_invalid("request uri has no authority").with_context(format!("uri: {uri}"))
        })?,
    };
    let path = path.unwrap_or_else(|| uri.path());
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    Ok(Uri::builder()
        .scheme(scheme)
        .authority(authority)
        .path_and_query(path_and_query.as_str())
        .build()?)
}
