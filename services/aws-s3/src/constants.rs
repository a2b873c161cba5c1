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

// Headers used by s3 routing.
pub const X_AMZ_BUCKET_REGION: &str = "x-amz-bucket-region";

/// Env value of the client region.
pub const AWS_REGION: &str = "AWS_REGION";
/// Env value of the client region, used when `AWS_REGION` is unset.
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
/// Env value of a custom s3 endpoint.
pub const AWS_ENDPOINT_URL_S3: &str = "AWS_ENDPOINT_URL_S3";
/// Env value to route access point requests to the ARN's region.
pub const AWS_S3_USE_ARN_REGION: &str = "AWS_S3_USE_ARN_REGION";
/// Env value to use dualstack endpoints.
pub const AWS_USE_DUALSTACK_ENDPOINT: &str = "AWS_USE_DUALSTACK_ENDPOINT";
/// Env value to use S3 Transfer Acceleration.
pub const AWS_S3_USE_ACCELERATE_ENDPOINT: &str = "AWS_S3_USE_ACCELERATE_ENDPOINT";
/// Env value of the addressing style: `auto`, `virtual` or `path`.
pub const AWS_S3_ADDRESSING_STYLE: &str = "AWS_S3_ADDRESSING_STYLE";

/// Partition used when neither the config nor the resolver tells otherwise.
pub const DEFAULT_PARTITION: &str = "aws";
/// Region probed when the client has none.
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_DNS_SUFFIX: &str = "amazonaws.com";

/// The request parameter carrying the bucket name or ARN.
pub const BUCKET_PARAM: &str = "Bucket";

// Operations that address the service root instead of a bucket.
pub const GET_BUCKET_LOCATION: &str = "GetBucketLocation";
pub const LIST_BUCKETS: &str = "ListBuckets";

/// An ARN is a valid literal bucket name for these operations.
pub const ARN_PARAM_SKIPPED_OPERATIONS: &[&str] = &["CreateBucket"];

/// Operations S3 Transfer Acceleration doesn't support.
pub const ACCELERATE_SKIPPED_OPERATIONS: &[&str] = &["ListBuckets", "CreateBucket", "DeleteBucket"];

pub const S3_ACCELERATE_HOST: &str = "s3-accelerate.amazonaws.com";
pub const S3_ACCELERATE_DUALSTACK_HOST: &str = "s3-accelerate.dualstack.amazonaws.com";
