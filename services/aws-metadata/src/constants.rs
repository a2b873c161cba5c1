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

/// Disable instance metadata when `true`.
pub const AWS_EC2_METADATA_DISABLED: &str = "AWS_EC2_METADATA_DISABLED";
/// Override the instance metadata endpoint.
pub const AWS_EC2_METADATA_SERVICE_ENDPOINT: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";
/// `IPv6` selects the IPv6 instance metadata endpoint.
pub const AWS_EC2_METADATA_SERVICE_ENDPOINT_MODE: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT_MODE";
/// Select the IPv6 instance metadata endpoint when `true`.
pub const AWS_IMDS_USE_IPV6: &str = "AWS_IMDS_USE_IPV6";
/// Attempts per instance metadata request.
pub const AWS_METADATA_SERVICE_NUM_ATTEMPTS: &str = "AWS_METADATA_SERVICE_NUM_ATTEMPTS";
/// Timeout of instance metadata requests in seconds.
pub const AWS_METADATA_SERVICE_TIMEOUT: &str = "AWS_METADATA_SERVICE_TIMEOUT";

/// Path of container credentials on `169.254.170.2`.
pub const AWS_CONTAINER_CREDENTIALS_RELATIVE_URI: &str = "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI";
/// Full url of container credentials.
pub const AWS_CONTAINER_CREDENTIALS_FULL_URI: &str = "AWS_CONTAINER_CREDENTIALS_FULL_URI";
/// `Authorization` header sent to the full container credentials url.
pub const AWS_CONTAINER_AUTHORIZATION_TOKEN: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN";

pub const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254/";
pub const DEFAULT_IMDS_IPV6_ENDPOINT: &str = "http://[fe80:ec2::254%eth0]/";
pub const IMDS_TOKEN_PATH: &str = "latest/api/token";
pub const IMDS_SECURITY_CREDENTIALS_PATH: &str = "latest/meta-data/iam/security-credentials/";

pub const X_AWS_EC2_METADATA_TOKEN: &str = "x-aws-ec2-metadata-token";
pub const X_AWS_EC2_METADATA_TOKEN_TTL_SECONDS: &str = "x-aws-ec2-metadata-token-ttl-seconds";
// 21600s (6h) is the maximum accepted by IMDS.
pub const IMDS_TOKEN_TTL_SECONDS: &str = "21600";

pub const CONTAINER_IP_ADDRESS: &str = "169.254.170.2";

/// Hosts metadata may be fetched from. IPv6 literals may carry a zone id.
pub const ALLOWED_HOSTS: &[&str] = &[
    "169.254.170.2",
    "169.254.169.254",
    "localhost",
    "127.0.0.1",
    "[fd00:ec2::254]",
    "[fe80:ec2::254]",
];
