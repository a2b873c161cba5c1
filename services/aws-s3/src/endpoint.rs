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

use crate::addressing::{
    parse_accelerate_endpoint, switch_host_s3_accelerate, switch_to_virtual_host_style,
};
use crate::constants::{DEFAULT_PARTITION, GET_BUCKET_LOCATION, LIST_BUCKETS};
use crate::{AccessPointContext, AddressingStyle, Config, ResolveEndpoint, S3Request};
use log::debug;
use reqroute_core::{Error, ErrorKind, Result};
use std::sync::Arc;

/// EndpointRewriter points a request at the endpoint its bucket or access point lives on.
///
/// Rules are applied in order, the first match wins:
///
/// 1. access point or outpost in the request context
/// 2. service root operations, left untouched
/// 3. S3 Transfer Acceleration
/// 4. the configured [`AddressingStyle`]
#[derive(Debug, Clone)]
pub struct EndpointRewriter {
    config: Arc<Config>,
    resolver: Arc<dyn ResolveEndpoint>,
}

impl EndpointRewriter {
    /// Create a new rewriter.
    pub fn new(config: Arc<Config>, resolver: Arc<dyn ResolveEndpoint>) -> Self {
        Self { config, resolver }
    }

    /// Rewrite the host and path of `req` for `operation`.
    pub fn rewrite(&self, req: &mut S3Request, operation: &str) -> Result<()> {
        if req.context.client_region.is_none() {
            req.context.client_region = self.config.region.clone();
        }

        if let Some(access_point) = req.context.access_point.clone() {
            return self.rewrite_for_access_point(req, &access_point);
        }

        if operation == GET_BUCKET_LOCATION
            || operation == LIST_BUCKETS
            || req.is_location_request()
        {
            debug!("operation {operation} targets the service root, skip rewrite");
            return Ok(());
        }

        if let Some(dualstack) = self.accelerate() {
            switch_host_s3_accelerate(req, operation, dualstack)?;
            return switch_to_virtual_host_style(req);
        }

        match self.config.addressing_style {
            Some(AddressingStyle::Path) => Ok(()),
            Some(AddressingStyle::Virtual) => switch_to_virtual_host_style(req),
            None if self.config.endpoint_url.is_some() => Ok(()),
            Some(AddressingStyle::Auto) | None => match switch_to_virtual_host_style(req) {
                Err(err) if err.kind() == ErrorKind::DnsNameInvalid => {
                    debug!("keep path-style addressing: {err}");
                    Ok(())
                }
                res => res,
            },
        }
    }

    /// Returns `Some(dualstack)` when requests go through S3 Transfer Acceleration.
    fn accelerate(&self) -> Option<bool> {
        if self.config.use_accelerate_endpoint {
            return Some(self.config.use_dualstack_endpoint);
        }
        self.config
            .endpoint_url
            .as_deref()
            .and_then(parse_accelerate_endpoint)
    }

    fn client_partition(&self) -> String {
        if let Some(partition) = &self.config.partition {
            return partition.clone();
        }
        self.config
            .region
            .as_deref()
            .and_then(|region| self.resolver.resolve("s3", region).ok())
            .map(|v| v.partition)
            .unwrap_or_else(|| DEFAULT_PARTITION.to_string())
    }

    fn rewrite_for_access_point(
        &self,
        req: &mut S3Request,
        access_point: &AccessPointContext,
    ) -> Result<()> {
        if let Some(endpoint_url) = &self.config.endpoint_url {
            return Err(Error::access_point_config_unsupported(
                "client cannot use a custom endpoint_url when an access point arn is specified",
            )
            .with_context(format!("endpoint_url: {endpoint_url}")));
        }
        if self.config.use_accelerate_endpoint {
            return Err(Error::access_point_config_unsupported(
                "client does not support s3 accelerate when an access point arn is specified",
            ));
        }
        if access_point.outpost_name.is_some() && self.config.use_dualstack_endpoint {
            return Err(Error::access_point_config_unsupported(
                "client does not support dualstack when an outpost arn is specified",
            ));
        }

        let client_partition = self.client_partition();
        if access_point.partition != client_partition {
            return Err(Error::access_point_config_unsupported(format!(
                "client is configured for partition '{client_partition}', but the access point arn is for partition '{}'",
                access_point.partition
            )));
        }

        let region = if self.config.use_arn_region {
            access_point.region.clone()
        } else {
            self.config
                .region
                .clone()
                .unwrap_or_else(|| access_point.region.clone())
        };
        if self.config.use_arn_region {
            req.context.signing_mut().region = Some(region.clone());
        }
        req.context.signing_mut().signing_name = Some(access_point.service.clone());

        let dns_suffix = self.resolver.resolve(&access_point.service, &region)?.dns_suffix;
        let host = match &access_point.outpost_name {
            Some(outpost) => format!(
                "{}-{}.{outpost}.s3-outposts.{region}.{dns_suffix}",
                access_point.name, access_point.account
            ),
            None => {
                let dualstack = if self.config.use_dualstack_endpoint {
                    ".dualstack"
                } else {
                    ""
                };
                format!(
                    "{}-{}.s3-accesspoint{dualstack}.{region}.{dns_suffix}",
                    access_point.name, access_point.account
                )
            }
        };

        if req.host() == Some(host.as_str()) {
            debug!("request already targets access point host {host}");
            return Ok(());
        }

        let path = strip_first_segment(req.uri.path(), &access_point.name);
        req.set_authority_and_path(&host, &path)
    }
}

/// Remove the leading `/{segment}` of `path`, returning `/` when nothing is left.
fn strip_first_segment(path: &str, segment: &str) -> String {
    let stripped = path
        .strip_prefix('/')
        .and_then(|v| v.strip_prefix(segment))
        .filter(|rest| rest.is_empty() || rest.starts_with('/'));

    match stripped {
        Some("") => "/".to_string(),
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}
