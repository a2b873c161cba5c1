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

//! Load temporary credentials from AWS metadata endpoints.
//!
//! - [`InstanceCredentialProvider`] talks to the EC2 instance metadata service, with session
//!   tokens when the service supports them.
//! - [`ContainerCredentialProvider`] talks to the container credentials endpoint.
//!
//! Both only reach hosts on a fixed allowlist and retry a bounded number of times. Soft
//! failures, like disabled metadata or a role without credentials, end in `None`.
//!
//! ## Example
//!
//! ```no_run
//! use reqroute_aws_metadata::{Config, InstanceMetadataFetcher};
//! use reqroute_core::{Context, OsEnv};
//! use reqroute_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> reqroute_core::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//!
//! let config = Config::default().from_env(&ctx);
//! let fetcher = InstanceMetadataFetcher::new(&config)?;
//! if let Some(cred) = fetcher.retrieve_iam_role_credentials(&ctx).await {
//!     println!("loaded credentials of role {:?}", cred.role_name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod constants;
pub use constants::{
    AWS_CONTAINER_AUTHORIZATION_TOKEN, AWS_CONTAINER_CREDENTIALS_FULL_URI,
    AWS_CONTAINER_CREDENTIALS_RELATIVE_URI, AWS_EC2_METADATA_DISABLED,
    AWS_EC2_METADATA_SERVICE_ENDPOINT, AWS_EC2_METADATA_SERVICE_ENDPOINT_MODE, AWS_IMDS_USE_IPV6,
    AWS_METADATA_SERVICE_NUM_ATTEMPTS, AWS_METADATA_SERVICE_TIMEOUT,
};

mod config;
pub use config::Config;
mod container;
pub use container::{ContainerCredentialProvider, ContainerMetadataFetcher};
mod credential;
pub use credential::Credentials;
mod fetcher;
pub use fetcher::{is_allowed_host, is_valid_endpoint_url, MetadataFetcher};
mod instance;
pub use instance::{InstanceCredentialProvider, InstanceMetadataFetcher};
