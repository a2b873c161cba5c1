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

//! Route S3 requests to the endpoint they belong to and load credentials from AWS
//! metadata endpoints.
//!
//! This crate re-exports [`reqroute_core`] and, behind features, the service crates:
//!
//! - `aws-s3`: [`aws_s3`], ARN handling, endpoint rewriting and region redirects.
//! - `aws-metadata`: [`aws_metadata`], instance and container credentials.
//! - `default-context`: [`DefaultContext`], HTTP, env and sleep backed by reqwest and tokio.
//!
//! ```no_run
//! use reqroute::{Context, DefaultContext};
//!
//! let ctx_impl = DefaultContext::new();
//! let ctx = Context::new()
//!     .with_http_send(ctx_impl.clone())
//!     .with_env(ctx_impl.clone())
//!     .with_sleep(ctx_impl);
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use reqroute_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::DefaultContext;

#[cfg(feature = "aws-metadata")]
pub mod aws_metadata {
    //! Credentials from AWS metadata endpoints.
    pub use reqroute_aws_metadata::*;
}

#[cfg(feature = "aws-s3")]
pub mod aws_s3 {
    //! S3 request routing.
    pub use reqroute_aws_s3::*;
}
