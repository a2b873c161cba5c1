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

//! Core components for routing S3 requests and loading metadata credentials.
//!
//! This crate provides the foundational types and traits shared by the reqroute crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP sending, environment
//!   access and sleeping between retries.
//! - **Error**: A single error type with an [`ErrorKind`] that callers can match on.
//! - **ProvideCredential**: The trait implemented by every credential source, and
//!   [`ProvideCredentialChain`] to try several of them in order.
//!
//! ## Example
//!
//! ```no_run
//! use reqroute_core::{Context, ProvideCredential, Result, SigningCredential};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl ProvideCredential for MyProvider {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             key: "my-access-key".to_string(),
//!         }))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new();
//! let cred = MyProvider.provide_credential(&ctx).await?;
//! assert!(cred.is_valid());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod utils;

mod api;
pub use api::{ProvideCredential, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
mod context;
pub use context::{
    Context, Env, HttpSend, NoopEnv, NoopHttpSend, NoopSleep, OsEnv, RequestTimeout, Sleep,
    StaticEnv,
};
mod error;
pub use error::{Error, ErrorKind, Result};
