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

use crate::addressing::is_dns_compatible;
use crate::constants::{BUCKET_PARAM, DEFAULT_REGION};
use crate::request::rebuild_uri;
use crate::{
    PartitionResolver, RegionCache, RequestContext, ResolveEndpoint, S3Request, S3Response,
    SigningContext,
};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode, Uri};
use log::{debug, warn};
use reqroute_core::{Context, Error, Result};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// HeadBucket probes a bucket to learn which region it lives in.
#[async_trait]
pub trait HeadBucket: Debug + Send + Sync + 'static {
    /// Send `HeadBucket` for `bucket`, returning the response even when it is an error.
    async fn head_bucket(&self, ctx: &Context, bucket: &str) -> Result<S3Response>;
}

/// UnsignedHeadBucket sends an anonymous `HEAD` for the bucket to the client's regional endpoint.
///
/// S3 answers with `x-amz-bucket-region` even when it refuses the request. The endpoint comes
/// from the resolver, so clients of other partitions probe their own partition. Buckets that
/// can't be a TLS host label are probed path-style.
#[derive(Debug, Clone)]
pub struct UnsignedHeadBucket {
    resolver: Arc<dyn ResolveEndpoint>,
    region: String,
}

impl Default for UnsignedHeadBucket {
    fn default() -> Self {
        Self::new(Arc::new(PartitionResolver), DEFAULT_REGION)
    }
}

impl UnsignedHeadBucket {
    /// Create a probe sending requests to the s3 endpoint of `region`.
    pub fn new(resolver: Arc<dyn ResolveEndpoint>, region: impl Into<String>) -> Self {
        Self {
            resolver,
            region: region.into(),
        }
    }

    /// Build the url probed for `bucket`.
    pub fn url(&self, bucket: &str) -> Result<Uri> {
        let endpoint = self.resolver.resolve("s3", &self.region)?.endpoint_url;
        let uri: Uri = endpoint.parse().map_err(|e| {
            Error::endpoint_config_invalid("s3 endpoint is not a valid uri")
                .with_source(e)
                .with_context(format!("endpoint: {endpoint}"))
        })?;
        let authority = uri.authority().map(|v| v.as_str()).ok_or_else(|| {
            Error::endpoint_config_invalid("s3 endpoint has no host")
                .with_context(format!("endpoint: {endpoint}"))
        })?;

        let tls = uri.scheme_str() != Some("http");
        if is_dns_compatible(bucket, tls) {
            rebuild_uri(&uri, None, Some(&format!("{bucket}.{authority}")), Some("/"))
        } else {
            rebuild_uri(&uri, None, None, Some(&format!("/{bucket}")))
        }
    }
}

#[async_trait]
impl HeadBucket for UnsignedHeadBucket {
    async fn head_bucket(&self, ctx: &Context, bucket: &str) -> Result<S3Response> {
        let url = self.url(bucket)?;
        let req = http::Request::builder()
            .method(Method::HEAD)
            .uri(url.clone())
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build head bucket request")
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?;

        let resp = ctx.http_send(req).await?;
        Ok(S3Response::from_http(&resp))
    }
}

/// The class of an error response, as far as redirects are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// `PermanentRedirect` error code.
    PermanentRedirect,
    /// `AuthorizationHeaderMalformed`, sent when signed for the wrong region.
    AuthorizationHeaderMalformed,
    /// `301` code without a redirect status, as surfaced for `HEAD` requests.
    MovedPermanently,
    /// Bodiless `400`.
    BadRequest,
    /// Response with status `301`, `302` or `307`.
    RedirectStatus,
    /// Everything else.
    Other,
}

/// The class of an operation, as far as redirects are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    /// `HeadObject`.
    HeadObject,
    /// `HeadBucket`, also used to discover regions.
    HeadBucket,
    /// Everything else.
    Other,
}

/// Whether a response is worth redirecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Redirect.
    Eligible,
    /// Redirect only when the response carries `x-amz-bucket-region`.
    RequiresRegionHeader,
    /// Redirect only when the error body carries `Region`.
    RequiresBodyRegion,
    /// Don't redirect.
    NotEligible,
}

/// `None` matches any operation.
type RedirectRule = (ErrorClass, Option<OperationClass>, Eligibility);

/// Rows are checked in order, the first match wins. Unmatched pairs are not eligible.
///
/// A bodiless `400` from `HeadBucket` without a region header is never redirected:
/// `HeadBucket` is the probe used to discover regions and would loop forever.
const REDIRECT_RULES: &[RedirectRule] = &[
    (ErrorClass::PermanentRedirect, None, Eligibility::Eligible),
    (
        ErrorClass::AuthorizationHeaderMalformed,
        None,
        Eligibility::RequiresBodyRegion,
    ),
    (
        ErrorClass::MovedPermanently,
        Some(OperationClass::HeadObject),
        Eligibility::Eligible,
    ),
    (
        ErrorClass::MovedPermanently,
        Some(OperationClass::HeadBucket),
        Eligibility::RequiresRegionHeader,
    ),
    (
        ErrorClass::BadRequest,
        Some(OperationClass::HeadObject),
        Eligibility::RequiresRegionHeader,
    ),
    (
        ErrorClass::BadRequest,
        Some(OperationClass::HeadBucket),
        Eligibility::RequiresRegionHeader,
    ),
    (ErrorClass::RedirectStatus, None, Eligibility::Eligible),
];

/// RedirectPolicy evaluates the redirect decision table for a response.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedirectPolicy;

impl RedirectPolicy {
    /// Classify the error carried by `response`.
    pub fn classify_error(response: &S3Response) -> ErrorClass {
        match response.error_code() {
            Some("PermanentRedirect") => return ErrorClass::PermanentRedirect,
            Some("AuthorizationHeaderMalformed") => {
                return ErrorClass::AuthorizationHeaderMalformed
            }
            _ => {}
        }

        if let Some(
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::TEMPORARY_REDIRECT,
        ) = response.status
        {
            return ErrorClass::RedirectStatus;
        }

        match response.error_code() {
            Some("301") => ErrorClass::MovedPermanently,
            Some("400") => ErrorClass::BadRequest,
            _ => ErrorClass::Other,
        }
    }

    /// Classify an operation name.
    pub fn classify_operation(operation: &str) -> OperationClass {
        match operation {
            "HeadObject" => OperationClass::HeadObject,
            "HeadBucket" => OperationClass::HeadBucket,
            _ => OperationClass::Other,
        }
    }

    /// Look up the eligibility of an error and operation pair.
    pub fn eligibility(error: ErrorClass, operation: OperationClass) -> Eligibility {
        REDIRECT_RULES
            .iter()
            .find(|(e, op, _)| *e == error && op.map_or(true, |op| op == operation))
            .map(|(_, _, eligibility)| *eligibility)
            .unwrap_or(Eligibility::NotEligible)
    }

    /// Check whether `response` to `operation` should be redirected.
    pub fn is_eligible(response: &S3Response, operation: &str) -> bool {
        let error = Self::classify_error(response);
        let operation = Self::classify_operation(operation);

        match Self::eligibility(error, operation) {
            Eligibility::Eligible => true,
            Eligibility::RequiresRegionHeader => response.bucket_region_header().is_some(),
            Eligibility::RequiresBodyRegion => response.error_region().is_some(),
            Eligibility::NotEligible => false,
        }
    }
}

/// RegionRedirector retries requests sent to the wrong region against the bucket's region.
///
/// Discovered regions are stored in a [`RegionCache`] shared by every request of the client,
/// later requests to the same bucket go straight to the right endpoint.
#[derive(Debug, Clone)]
pub struct RegionRedirector {
    resolver: Arc<dyn ResolveEndpoint>,
    head_bucket: Arc<dyn HeadBucket>,
    cache: Arc<RegionCache>,
}

impl RegionRedirector {
    /// Create a new redirector.
    pub fn new(
        resolver: Arc<dyn ResolveEndpoint>,
        head_bucket: Arc<dyn HeadBucket>,
        cache: Arc<RegionCache>,
    ) -> Self {
        Self {
            resolver,
            head_bucket,
            cache,
        }
    }

    /// The cache shared by this redirector.
    pub fn cache(&self) -> &Arc<RegionCache> {
        &self.cache
    }

    /// Seed the signing context of a new request from the cache.
    ///
    /// Requests to uncached buckets get a signing context holding just the bucket, so a
    /// later redirect knows which bucket to probe. Access point requests are left alone.
    pub fn redirect_from_cache(&self, params: &Map<String, Value>, ctx: &mut RequestContext) {
        if ctx.access_point.is_some() {
            return;
        }
        let Some(bucket) = params.get(BUCKET_PARAM).and_then(Value::as_str) else {
            return;
        };

        ctx.signing = Some(self.cache.get(bucket).unwrap_or_else(|| SigningContext {
            bucket: Some(bucket.to_string()),
            ..Default::default()
        }));
    }

    /// Inspect `response` and point `req` at the bucket's region when S3 says it is wrong.
    ///
    /// Returns the delay before retrying, always zero, or `None` when the request should
    /// not be retried. A request is redirected at most once.
    pub async fn redirect_from_error(
        &self,
        ctx: &Context,
        req: &mut S3Request,
        response: Option<&S3Response>,
        operation: &str,
    ) -> Option<Duration> {
        let response = response?;

        if req.context.access_point.is_some() {
            debug!("s3 request targets an access point, not redirecting");
            return None;
        }
        if req.context.redirected {
            debug!("s3 request was previously redirected, not redirecting");
            return None;
        }
        if !RedirectPolicy::is_eligible(response, operation) {
            return None;
        }

        let Some(bucket) = req.context.signing_bucket().map(|v| v.to_string()) else {
            debug!("s3 request has no bucket in its signing context, not redirecting");
            return None;
        };

        let region = self.get_bucket_region(ctx, &bucket, response).await?;
        let endpoint = match self.resolver.resolve("s3", &region) {
            Ok(v) => v.endpoint_url,
            Err(err) => {
                warn!("failed to resolve s3 endpoint for region {region}: {err}");
                return None;
            }
        };

        debug!(
            "s3 client configured for region {} but bucket {bucket} is in region {region}; redirecting to {endpoint}",
            req.context.client_region.as_deref().unwrap_or("unknown"),
        );

        let signing = SigningContext {
            bucket: Some(bucket.clone()),
            region: Some(region),
            endpoint: Some(endpoint),
            signing_name: req
                .context
                .signing
                .as_ref()
                .and_then(|v| v.signing_name.clone()),
        };
        let previous = req.context.signing.replace(signing.clone());
        if let Err(err) = self.set_request_url(req) {
            warn!("failed to rewrite redirected s3 request: {err}");
            req.context.signing = previous;
            return None;
        }
        self.cache.put(bucket, signing);
        req.context.redirected = true;

        Some(Duration::ZERO)
    }

    /// Point `req` at the endpoint of its signing context, keeping the request's scheme.
    ///
    /// A virtual-host request keeps its bucket label in front of the new host.
    pub fn set_request_url(&self, req: &mut S3Request) -> Result<()> {
        let Some(signing) = &req.context.signing else {
            return Ok(());
        };
        let Some(endpoint) = &signing.endpoint else {
            return Ok(());
        };

        let endpoint: Uri = endpoint.parse().map_err(|e| {
            Error::endpoint_config_invalid("signing endpoint is not a valid uri")
                .with_source(e)
                .with_context(format!("endpoint: {endpoint}"))
        })?;
        let endpoint_authority = endpoint.authority().map(|v| v.as_str()).ok_or_else(|| {
            Error::endpoint_config_invalid("signing endpoint has no host")
                .with_context(format!("endpoint: {endpoint}"))
        })?;

        let virtual_bucket = signing.bucket.as_deref().filter(|bucket| {
            req.host()
                .and_then(|host| host.strip_prefix(*bucket))
                .is_some_and(|rest| rest.starts_with('.'))
        });
        let authority = match virtual_bucket {
            Some(bucket) if !endpoint_authority.starts_with(&format!("{bucket}.")) => {
                format!("{bucket}.{endpoint_authority}")
            }
            _ => endpoint_authority.to_string(),
        };

        req.uri = rebuild_uri(&req.uri, None, Some(&authority), None)?;
        Ok(())
    }

    /// Find the region of `bucket`.
    ///
    /// Looks at the error body, then the `x-amz-bucket-region` header of `response`, then
    /// probes the bucket with `HeadBucket`. Probe failures are swallowed.
    pub async fn get_bucket_region(
        &self,
        ctx: &Context,
        bucket: &str,
        response: &S3Response,
    ) -> Option<String> {
        if let Some(region) = response.error_region() {
            return Some(region.to_string());
        }
        if let Some(region) = response.bucket_region_header() {
            return Some(region.to_string());
        }

        match self.head_bucket.head_bucket(ctx, bucket).await {
            Ok(resp) => resp
                .bucket_region_header()
                .or_else(|| resp.error_region())
                .map(|v| v.to_string()),
            Err(err) => {
                debug!("head bucket probe for {bucket} failed: {err}");
                None
            }
        }
    }
}
