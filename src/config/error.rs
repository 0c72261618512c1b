// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Configuration-specific error types for cfdot
//!
//! Every error in this module is an operator input problem: a missing or
//! malformed address, TLS material that is absent or unreadable, or an
//! environment variable that does not hold a boolean. They all map to the
//! validation exit code and are reported together with the usage text of the
//! command that was invoked.
//!
//! The messages name the flag and environment variable of the service being
//! configured so the operator knows which knob to turn.

use super::resolve::Service;
use std::fmt;
use thiserror::Error;

/// The kind of TLS file referenced by [`ConfigError::UnreadableFile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Certificate authority bundle used to verify the server
    CaCert,
    /// Client certificate presented during mutual TLS
    Cert,
    /// Client private key presented during mutual TLS
    Key,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileKind::CaCert => "CA cert",
            FileKind::Cert => "cert",
            FileKind::Key => "key",
        };
        f.write_str(label)
    }
}

/// Configuration-specific error types
///
/// Variants are ordered the way validation reports them: address problems
/// first, then TLS material.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No address was given by flag or environment
    #[error(
        "{} not set. Please specify one with the '--{}' flag or the '{}' environment variable.",
        .service.address_label(),
        .service.address_flag(),
        .service.address_env()
    )]
    MissingAddress { service: Service },

    /// The address could not be parsed at all
    #[error(
        "The value '{value}' is not a valid {}. Please specify one with the '--{}' flag or the '{}' environment variable.",
        .service.address_label(),
        .service.address_flag(),
        .service.address_env()
    )]
    InvalidAddress { service: Service, value: String },

    /// The address parsed but is neither `http` nor `https`
    #[error(
        "The URL '{value}' does not have an 'http' or 'https' scheme. Please specify one with the '--{}' flag or the '{}' environment variable.",
        .service.address_flag(),
        .service.address_env()
    )]
    UnsupportedScheme { service: Service, value: String },

    /// Secure endpoint without a CA and without skip-verify
    #[error(
        "--{} must be specified if --{} is not set",
        .service.ca_cert_flag(),
        .service.skip_verify_flag()
    )]
    MissingCaCert { service: Service },

    /// Secure endpoint with only one half of the client key pair
    #[error(
        "--{} and --{} must both be specified for TLS connections.",
        .service.cert_flag(),
        .service.key_flag()
    )]
    MissingClientCertOrKey { service: Service },

    /// A TLS file that is set but cannot be opened
    #[error("{kind} file '{path}' doesn't exist or is not readable: {reason}")]
    UnreadableFile {
        kind: FileKind,
        path: String,
        reason: String,
    },

    /// A boolean environment variable with an unrecognised literal
    #[error("The value '{value}' is not a valid value for {var}. Please specify one of the following valid boolean values: 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False")]
    InvalidBoolean { var: String, value: String },

    /// Configuration file or `CFDOT_` environment loading errors
    #[error("Configuration parsing error: {0}")]
    Load(#[from] config::ConfigError),
}

impl ConfigError {
    /// Create an unreadable-file error from the I/O failure that caused it
    pub fn unreadable_file<P: Into<String>>(
        kind: FileKind,
        path: P,
        source: &std::io::Error,
    ) -> Self {
        Self::UnreadableFile {
            kind,
            path: path.into(),
            reason: source.to_string(),
        }
    }
}
