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

use crate::constants::{ARN_PARAM_SKIPPED_OPERATIONS, BUCKET_PARAM};
use crate::{parse_arn, AccessPointContext, Arn, RequestContext};
use log::debug;
use reqroute_core::{Error, Result};
use serde_json::{Map, Value};

/// ArnParamHandler turns an access point ARN passed as the bucket parameter into
/// the bare access point name plus an [`AccessPointContext`].
///
/// ```
/// use reqroute_aws_s3::{ArnParamHandler, RequestContext};
/// use serde_json::{json, Map, Value};
///
/// let mut params: Map<String, Value> = Map::new();
/// params.insert(
///     "Bucket".to_string(),
///     json!("arn:aws:s3:us-west-2:123456789012:accesspoint/endpoint"),
/// );
/// let mut ctx = RequestContext::default();
///
/// ArnParamHandler::new()
///     .handle(&mut params, "GetObject", &mut ctx)
///     .unwrap();
/// assert_eq!(params["Bucket"], json!("endpoint"));
/// assert_eq!(ctx.access_point.unwrap().account, "123456789012");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ArnParamHandler;

impl ArnParamHandler {
    /// Create a new handler.
    pub fn new() -> Self {
        Self
    }

    /// Rewrite `params["Bucket"]` in place when it holds an access point ARN.
    pub fn handle(
        &self,
        params: &mut Map<String, Value>,
        operation: &str,
        ctx: &mut RequestContext,
    ) -> Result<()> {
        if ARN_PARAM_SKIPPED_OPERATIONS.contains(&operation) {
            return Ok(());
        }

        let Some(bucket) = params.get(BUCKET_PARAM).and_then(Value::as_str) else {
            return Ok(());
        };
        if !bucket.starts_with("arn:") {
            return Ok(());
        }

        let arn = parse_arn(bucket)?;
        let access_point = access_point_from_arn(&arn)?;
        debug!(
            "operation {operation} targets access point {} in {}",
            access_point.name, access_point.region
        );

        params.insert(
            BUCKET_PARAM.to_string(),
            Value::String(access_point.name.clone()),
        );
        ctx.access_point = Some(access_point);
        Ok(())
    }
}

fn access_point_from_arn(arn: &Arn) -> Result<AccessPointContext> {
    let (resource_type, rest) = split_resource(&arn.resource);

    let (name, outpost_name) = match (resource_type, rest) {
        ("accesspoint", Some(name)) if !name.is_empty() => (name.to_string(), None),
        ("outpost", Some(rest)) => {
            let (outpost, name) = parse_outpost_resource(rest).ok_or_else(|| {
                Error::outpost_resource_unsupported(
                    "outpost arn must be outpost/<outpost-id>/accesspoint/<name>",
                )
                .with_context(format!("arn: {arn}"))
            })?;
            (name.to_string(), Some(outpost.to_string()))
        }
        _ => {
            return Err(Error::arn_resource_unsupported(
                "only access point and outpost access point arns are supported",
            )
            .with_context(format!("arn: {arn}")))
        }
    };

    Ok(AccessPointContext {
        name,
        account: arn.account.clone(),
        region: arn.region.clone(),
        partition: arn.partition.clone(),
        service: arn.service.clone(),
        outpost_name,
    })
}

/// Split `type/rest` or `type:rest`.
fn split_resource(resource: &str) -> (&str, Option<&str>) {
    match resource.find(['/', ':']) {
        Some(idx) => (&resource[..idx], Some(&resource[idx + 1..])),
        None => (resource, None),
    }
}

/// Parse `<outpost-id>[/:]accesspoint[/:]<name>`.
fn parse_outpost_resource(rest: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = rest.split(['/', ':']).collect();
    match parts.as_slice() {
        [outpost, "accesspoint", name] if is_outpost_label(outpost) && is_outpost_label(name) => {
            Some((*outpost, *name))
        }
        _ => None,
    }
}

fn is_outpost_label(v: &str) -> bool {
    (1..=63).contains(&v.len()) && v.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
