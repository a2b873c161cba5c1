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

//! Route S3 requests to the endpoint their bucket, access point or region needs.
//!
//! A request flows through these steps:
//!
//! 1. [`ArnParamHandler`] replaces an access point ARN in the `Bucket` parameter with the
//!    access point name and records an [`AccessPointContext`].
//! 2. [`RegionRedirector::redirect_from_cache`] seeds the signing context from regions
//!    discovered earlier.
//! 3. [`EndpointRewriter`] moves the bucket into the host, switches to accelerate or access
//!    point hosts, or leaves the request path-style.
//! 4. After a response, [`RegionRedirector::redirect_from_error`] decides whether the request
//!    must be retried against another region.
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use reqroute_aws_s3::{Config, EndpointRewriter, PartitionResolver, S3Request};
//! use std::sync::Arc;
//!
//! # fn main() -> reqroute_core::Result<()> {
//! let config = Config {
//!     region: Some("us-west-2".to_string()),
//!     ..Default::default()
//! };
//! let rewriter = EndpointRewriter::new(Arc::new(config), Arc::new(PartitionResolver));
//!
//! let uri = "https://s3.us-west-2.amazonaws.com/mybucket/key.txt".parse()?;
//! let mut req = S3Request::new(Method::GET, uri);
//! rewriter.rewrite(&mut req, "GetObject")?;
//! assert_eq!(
//!     req.uri.to_string(),
//!     "https://mybucket.s3.us-west-2.amazonaws.com/key.txt"
//! );
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{
    AWS_DEFAULT_REGION, AWS_ENDPOINT_URL_S3, AWS_REGION, AWS_S3_ADDRESSING_STYLE,
    AWS_S3_USE_ACCELERATE_ENDPOINT, AWS_S3_USE_ARN_REGION, AWS_USE_DUALSTACK_ENDPOINT,
};

mod access_point;
pub use access_point::ArnParamHandler;
mod addressing;
pub use addressing::{
    is_dns_compatible, switch_host_s3_accelerate, switch_to_virtual_host_style, AddressingStyle,
};
mod arn;
pub use arn::{parse_arn, Arn};
mod cache;
pub use cache::RegionCache;
mod config;
pub use config::Config;
mod endpoint;
pub use endpoint::EndpointRewriter;
mod redirect;
pub use redirect::{
    Eligibility, ErrorClass, HeadBucket, OperationClass, RedirectPolicy, RegionRedirector,
    UnsignedHeadBucket,
};
mod request;
pub use request::{AccessPointContext, RequestContext, S3Request, SigningContext};
mod resolve;
pub use resolve::{partition_of, PartitionResolver, ResolveEndpoint, ResolvedEndpoint};
mod response;
pub use response::{S3Error, S3Response};
