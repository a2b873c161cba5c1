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
use crate::AddressingStyle;
use log::warn;
use reqroute_core::utils::parse_bool_flag;
use reqroute_core::Context;

/// Config for s3 request routing.
#[derive(Clone, Debug)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// `partition` of the client.
    ///
    /// Derived from `region` when not set.
    pub partition: Option<String>,
    /// `endpoint_url` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ENDPOINT_URL_S3`]
    pub endpoint_url: Option<String>,
    /// `addressing_style` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_S3_ADDRESSING_STYLE`]
    ///
    /// Unset behaves like [`AddressingStyle::Auto`], except with a custom `endpoint_url`
    /// where requests stay path-style.
    pub addressing_style: Option<AddressingStyle>,
    /// `use_accelerate_endpoint` will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_S3_USE_ACCELERATE_ENDPOINT`]
    pub use_accelerate_endpoint: bool,
    /// `use_dualstack_endpoint` will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_USE_DUALSTACK_ENDPOINT`]
    pub use_dualstack_endpoint: bool,
    /// `use_arn_region` will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_S3_USE_ARN_REGION`]
    /// - default to `true`
    pub use_arn_region: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            partition: None,
            endpoint_url: None,
            addressing_style: None,
            use_accelerate_endpoint: false,
            use_dualstack_endpoint: false,
            use_arn_region: true,
        }
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.region.is_none() {
            self.region = ctx
                .env_var(AWS_REGION)
                .or_else(|| ctx.env_var(AWS_DEFAULT_REGION));
        }
        if self.endpoint_url.is_none() {
            self.endpoint_url = ctx.env_var(AWS_ENDPOINT_URL_S3);
        }
        if self.addressing_style.is_none() {
            if let Some(v) = ctx.env_var(AWS_S3_ADDRESSING_STYLE) {
                match v.parse() {
                    Ok(style) => self.addressing_style = Some(style),
                    Err(err) => warn!("ignore {AWS_S3_ADDRESSING_STYLE}: {err}"),
                }
            }
        }
        if let Some(v) = ctx.env_var(AWS_S3_USE_ACCELERATE_ENDPOINT) {
            self.use_accelerate_endpoint = parse_bool_flag(&v);
        }
        if let Some(v) = ctx.env_var(AWS_USE_DUALSTACK_ENDPOINT) {
            self.use_dualstack_endpoint = parse_bool_flag(&v);
        }
        if let Some(v) = ctx.env_var(AWS_S3_USE_ARN_REGION) {
            self.use_arn_region = parse_bool_flag(&v);
        }
        self
    }
}
