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

use crate::constants::{DEFAULT_DNS_SUFFIX, DEFAULT_PARTITION};
use reqroute_core::{Error, Result};
use std::fmt::Debug;

/// ResolvedEndpoint is the endpoint of a service in a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Full url such as `https://s3.us-west-2.amazonaws.com`.
    pub endpoint_url: String,
    /// DNS suffix such as `amazonaws.com`.
    pub dns_suffix: String,
    /// Partition such as `aws`.
    pub partition: String,
}

/// ResolveEndpoint maps a service and region to its endpoint.
///
/// Implementations must be free of side effects, the result is treated as authoritative.
pub trait ResolveEndpoint: Debug + Send + Sync + 'static {
    /// Resolve the endpoint of `service` in `region`.
    fn resolve(&self, service: &str, region: &str) -> Result<ResolvedEndpoint>;
}

/// PartitionResolver resolves endpoints from the well known region prefixes of each partition.
///
/// ```
/// use reqroute_aws_s3::{PartitionResolver, ResolveEndpoint};
///
/// let endpoint = PartitionResolver.resolve("s3", "cn-north-1").unwrap();
/// assert_eq!(endpoint.endpoint_url, "https://s3.cn-north-1.amazonaws.com.cn");
/// assert_eq!(endpoint.partition, "aws-cn");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PartitionResolver;

impl ResolveEndpoint for PartitionResolver {
    fn resolve(&self, service: &str, region: &str) -> Result<ResolvedEndpoint> {
        if region.is_empty() {
            return Err(Error::endpoint_config_invalid(
                "region is required to resolve an endpoint",
            )
            .with_context(format!("service: {service}")));
        }

        let (partition, dns_suffix) = partition_of(region);
        Ok(ResolvedEndpoint {
            endpoint_url: format!("https://{service}.{region}.{dns_suffix}"),
            dns_suffix: dns_suffix.to_string(),
            partition: partition.to_string(),
        })
    }
}

/// Returns the partition and dns suffix serving `region`.
pub fn partition_of(region: &str) -> (&'static str, &'static str) {
    if region.starts_with("cn-") {
        ("aws-cn", "amazonaws.com.cn")
    } else if region.starts_with("us-gov-") {
        ("aws-us-gov", DEFAULT_DNS_SUFFIX)
    } else if region.starts_with("us-isob-") {
        ("aws-iso-b", "sc2s.sgov.gov")
    } else if region.starts_with("us-iso-") {
        ("aws-iso", "c2s.ic.gov")
    } else {
        (DEFAULT_PARTITION, DEFAULT_DNS_SUFFIX)
    }
}
