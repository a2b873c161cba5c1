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

use reqroute_core::{Error, Result};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Arn is a parsed `arn:partition:service:region:account:resource` identifier.
///
/// `region` and `account` may be empty. `resource` keeps any nested `:` or `/`
/// delimiters, for example `accesspoint/myendpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    /// Partition such as `aws` or `aws-cn`.
    pub partition: String,
    /// Service namespace such as `s3`.
    pub service: String,
    /// Region, may be empty.
    pub region: String,
    /// Account id, may be empty.
    pub account: String,
    /// Everything after the fifth `:`.
    pub resource: String,
}

/// Parse the input into an [`Arn`].
pub fn parse_arn(input: &str) -> Result<Arn> {
    input.parse()
}

impl FromStr for Arn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() < 6 || parts[0] != "arn" {
            return Err(Error::arn_malformed("provided arn is not in the expected format")
                .with_context(format!("arn: {s}")));
        }

        Ok(Arn {
            partition: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            resource: parts[5].to_string(),
        })
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}
