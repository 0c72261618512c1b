// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Error handling for cfdot
//!
//! [`CfdotError`] wraps the module errors and decides the process exit code:
//!
//! | kind | exit code |
//! |---|---|
//! | configuration, validation and argument errors | 3 |
//! | client construction errors (unusable TLS material) | 3 |
//! | RPC errors reported by or on the way to the backend | 1 |
//! | local I/O errors | 1 |
//!
//! Errors with exit code 3 are reported together with the usage text of the
//! command that was invoked.

use crate::client::error::ClientError;
use crate::commands::error::CommandError;
use crate::config::ConfigError;
use thiserror::Error;

/// Exit code for configuration and argument errors
pub const EXIT_VALIDATION: i32 = 3;
/// Exit code for RPC and I/O errors
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for cfdot operations
#[derive(Error, Debug)]
pub enum CfdotError {
    /// Connection configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Command argument errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Client construction and RPC errors
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CfdotError {
    /// Whether the error is an input problem detected before any RPC
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Config(_) | Self::Command(_) => true,
            Self::Client(e) => e.is_construction(),
            Self::Io(_) => false,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_validation() {
            EXIT_VALIDATION
        } else {
            EXIT_FAILURE
        }
    }

    /// Short identifier of the error kind, used in log output
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Command(_) => "COMMAND_ERROR",
            Self::Client(e) if e.is_construction() => "CLIENT_CONSTRUCTION_ERROR",
            Self::Client(_) => "RPC_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}
