// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Client-specific error types for cfdot
//!
//! Two families of failures live here:
//!
//! - Construction failures ([`ClientError::Tls`],
//!   [`ClientError::Configuration`]). The TLS files were readable but their
//!   content could not be used. These are reported like validation errors.
//! - RPC failures (everything else). The request was sent and the backend
//!   rejected it, or the connection broke. Backend errors keep the type and
//!   message the service returned.

use serde_json::Value;
use thiserror::Error;

/// Client-specific error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network/HTTP errors from reqwest
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Errors reported by the backend
    #[error(transparent)]
    Api(#[from] ApiResponseError),

    /// TLS material errors during client construction
    #[error("TLS error: {0}")]
    Tls(#[from] TlsError),

    /// Response bodies that are not JSON
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed event stream data
    #[error("Event stream error: {message}")]
    Stream { message: String },

    /// Client configuration errors
    #[error("Client configuration error: {message}")]
    Configuration { message: String },
}

/// Errors carried in backend responses
#[derive(Error, Debug)]
pub enum ApiResponseError {
    /// Structured error from the response envelope
    #[error("{error_type}: {message}")]
    Backend {
        status: u16,
        error_type: String,
        message: String,
    },

    /// Non-success status without a structured error
    #[error("Server error: {message} (status: {status})")]
    ServerError {
        status: u16,
        message: String,
        response: Option<Value>,
    },

    /// Successful response without the expected payload
    #[error("Response is missing the '{field}' field")]
    MissingField { field: String },

    /// Payload field with an unexpected JSON type
    #[error("Response field '{field}' has an unexpected type")]
    InvalidField { field: String },
}

/// TLS configuration errors
#[derive(Error, Debug)]
pub enum TlsError {
    /// Certificate file not found or unreadable
    #[error("Certificate file error: {path} - {reason}")]
    CertificateFile { path: String, reason: String },

    /// Private key file not found or unreadable
    #[error("Private key file error: {path} - {reason}")]
    PrivateKeyFile { path: String, reason: String },

    /// CA certificate file not found or unreadable
    #[error("CA certificate file error: {path} - {reason}")]
    CaCertificateFile { path: String, reason: String },

    /// TLS configuration error
    #[error("TLS configuration error: {message}")]
    Configuration { message: String },
}

impl ClientError {
    /// Create a new configuration error
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new event stream error
    pub fn stream<T: Into<String>>(message: T) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    /// Whether the error happened while building the client
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Tls(_) | Self::Configuration { .. })
    }
}

impl ApiResponseError {
    /// Build a backend error from an `{"type": ..., "message": ...}` object
    pub fn from_envelope(status: u16, error: &Value) -> Self {
        let field = |name: &str| {
            error
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let mut error_type = field("type");
        if error_type.is_empty() {
            error_type = "UnknownError".to_string();
        }

        Self::Backend {
            status,
            error_type,
            message: field("message"),
        }
    }
}

impl TlsError {
    /// Create a certificate file error
    pub fn certificate_file<P: Into<String>, R: Into<String>>(
        path: P,
        reason: R,
    ) -> Self {
        Self::CertificateFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a private key file error
    pub fn private_key_file<P: Into<String>, R: Into<String>>(
        path: P,
        reason: R,
    ) -> Self {
        Self::PrivateKeyFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a CA certificate file error
    pub fn ca_certificate_file<P: Into<String>, R: Into<String>>(
        path: P,
        reason: R,
    ) -> Self {
        Self::CaCertificateFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a TLS configuration error
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
