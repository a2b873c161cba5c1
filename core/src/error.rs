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

use std::fmt;
use thiserror::Error;

/// The error type for reqroute operations
#[derive(Error, Debug)]
#[error("{kind}: {message}{}", render_context(.context))]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
    context: Vec<String>,
    retryable: bool,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a well-formed `arn:partition:service:region:account:resource` string.
    ArnMalformed,

    /// The ARN parsed, but its resource type can't address a bucket.
    ArnResourceUnsupported,

    /// An outpost ARN whose resource is missing the outpost id or access point name.
    OutpostResourceUnsupported,

    /// The client configuration can't be combined with an access point request,
    /// for example a custom endpoint or a partition mismatch.
    AccessPointConfigUnsupported,

    /// The bucket name can't be used as a host label.
    DnsNameInvalid,

    /// A configured endpoint is not a valid URI.
    EndpointConfigInvalid,

    /// The metadata host is not on the allowlist.
    HostNotAllowed,

    /// Metadata could not be retrieved after all attempts.
    MetadataRetrieval,

    /// Request cannot be built (invalid uri, header, etc.)
    RequestInvalid,

    /// The transport timed out while connecting or reading.
    Timeout,

    /// Unexpected errors (network, I/O, service errors, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            context: Vec::new(),
            retryable: false,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a piece of context, rendered after the message.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Mark whether this error is worth retrying.
    pub fn set_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message without context.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the attached context.
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Check if this error may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Check if this error is a transport timeout.
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

// Convenience constructors
impl Error {
    /// Create an arn malformed error
    pub fn arn_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArnMalformed, message)
    }

    /// Create an arn resource unsupported error
    pub fn arn_resource_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArnResourceUnsupported, message)
    }

    /// Create an outpost resource unsupported error
    pub fn outpost_resource_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutpostResourceUnsupported, message)
    }

    /// Create an access point config unsupported error
    pub fn access_point_config_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessPointConfigUnsupported, message)
    }

    /// Create a dns name invalid error
    pub fn dns_name_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DnsNameInvalid, message)
    }

    /// Create an endpoint config invalid error
    pub fn endpoint_config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EndpointConfigInvalid, message)
    }

    /// Create a host not allowed error
    pub fn host_not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HostNotAllowed, message)
    }

    /// Create a metadata retrieval error
    pub fn metadata_retrieval(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MetadataRetrieval, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message).set_retryable(true)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

fn render_context(context: &[String]) -> String {
    context.iter().map(|v| format!(", {v}")).collect()
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ArnMalformed => write!(f, "malformed arn"),
            ErrorKind::ArnResourceUnsupported => write!(f, "unsupported arn resource"),
            ErrorKind::OutpostResourceUnsupported => write!(f, "unsupported outpost resource"),
            ErrorKind::AccessPointConfigUnsupported => {
                write!(f, "unsupported access point configuration")
            }
            ErrorKind::DnsNameInvalid => write!(f, "invalid dns name"),
            ErrorKind::EndpointConfigInvalid => write!(f, "invalid endpoint configuration"),
            ErrorKind::HostNotAllowed => write!(f, "host not allowed"),
            ErrorKind::MetadataRetrieval => write!(f, "metadata retrieval failed"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::Timeout => write!(f, "timed out"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
