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
use log::warn;
use reqroute_core::utils::parse_bool_flag;
use reqroute_core::Context;
use std::time::Duration;

/// Config for loading credentials from the instance metadata service.
#[derive(Clone, Debug)]
pub struct Config {
    /// `ec2_metadata_disabled` will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_EC2_METADATA_DISABLED`]
    pub ec2_metadata_disabled: bool,
    /// `ec2_metadata_service_endpoint` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_EC2_METADATA_SERVICE_ENDPOINT`]
    ///
    /// Empty values are treated as unset.
    pub ec2_metadata_service_endpoint: Option<String>,
    /// `imds_use_ipv6` will be loaded from:
    ///
    /// - this field
    /// - env value: [`AWS_IMDS_USE_IPV6`]
    /// - env value: [`AWS_EC2_METADATA_SERVICE_ENDPOINT_MODE`] equal to `IPv6`
    pub imds_use_ipv6: bool,
    /// `num_attempts` will be loaded from:
    ///
    /// - env value: [`AWS_METADATA_SERVICE_NUM_ATTEMPTS`]
    /// - this field, default to `1`
    pub num_attempts: usize,
    /// `timeout` for every metadata request, loaded from:
    ///
    /// - env value: [`AWS_METADATA_SERVICE_TIMEOUT`] in seconds
    /// - this field, default to `1s`
    pub timeout: Duration,
    /// `user_agent` sent with every metadata request.
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ec2_metadata_disabled: false,
            ec2_metadata_service_endpoint: None,
            imds_use_ipv6: false,
            num_attempts: 1,
            timeout: Duration::from_secs(1),
            user_agent: None,
        }
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(AWS_EC2_METADATA_DISABLED) {
            self.ec2_metadata_disabled = parse_bool_flag(&v);
        }
        if self.ec2_metadata_service_endpoint.is_none() {
            self.ec2_metadata_service_endpoint = ctx
                .env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT)
                .filter(|v| !v.is_empty());
        }
        if let Some(v) = ctx.env_var(AWS_IMDS_USE_IPV6) {
            self.imds_use_ipv6 = parse_bool_flag(&v);
        }
        if let Some(v) = ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT_MODE) {
            if v.trim().eq_ignore_ascii_case("ipv6") {
                self.imds_use_ipv6 = true;
            }
        }
        if let Some(v) = ctx.env_var(AWS_METADATA_SERVICE_NUM_ATTEMPTS) {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.num_attempts = n,
                _ => warn!("ignore invalid {AWS_METADATA_SERVICE_NUM_ATTEMPTS}: {v}"),
            }
        }
        if let Some(v) = ctx.env_var(AWS_METADATA_SERVICE_TIMEOUT) {
            match v
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            {
                Some(timeout) if !timeout.is_zero() => self.timeout = timeout,
                _ => warn!("ignore invalid {AWS_METADATA_SERVICE_TIMEOUT}: {v}"),
            }
        }
        self
    }
}
