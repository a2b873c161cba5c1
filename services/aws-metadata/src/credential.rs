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

use reqroute_core::utils::Redact;
use reqroute_core::SigningCredential;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Temporary credentials served by a metadata endpoint.
///
/// Fetched fresh on every call, callers own any caching.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key id for aws services.
    pub access_key: String,
    /// Secret access key for aws services.
    pub secret_key: String,
    /// Session token for aws services.
    pub token: String,
    /// Expiration time as served, usually RFC 3339.
    pub expiry_time: String,
    /// The IAM role the credentials belong to, known for instance credentials only.
    pub role_name: Option<String>,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &Redact::from(&self.access_key))
            .field("secret_key", &Redact::from(&self.secret_key))
            .field("token", &Redact::from(&self.token))
            .field("expiry_time", &self.expiry_time)
            .field("role_name", &self.role_name)
            .finish()
    }
}

impl SigningCredential for Credentials {
    fn is_valid(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }
}

/// The credentials document. Error documents like `{"Code": .., "Message": ..}` leave the
/// credential fields empty.
#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub(crate) struct CredentialsDocument {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    token: Option<String>,
    expiration: Option<String>,

    code: Option<String>,
    message: Option<String>,
}

impl CredentialsDocument {
    /// Convert into [`Credentials`] if every credential field is present.
    pub(crate) fn into_credentials(self, role_name: Option<String>) -> Option<Credentials> {
        Some(Credentials {
            access_key: self.access_key_id?,
            secret_key: self.secret_access_key?,
            token: self.token?,
            expiry_time: self.expiration?,
            role_name,
        })
    }

    /// Describe the error document, if any, without credential material.
    pub(crate) fn error_summary(&self) -> String {
        format!(
            "code: {}, message: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.message.as_deref().unwrap_or_default()
        )
    }
}
