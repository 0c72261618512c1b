// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Command argument errors
//!
//! Raised while checking positional arguments and entity specs, before any
//! client is built.

use thiserror::Error;

/// Command-specific error types
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Missing arguments")]
    MissingArguments,

    #[error("Too many arguments specified")]
    ExtraArguments,

    /// Create commands take exactly one spec argument
    #[error("missing spec argument")]
    MissingSpec,

    #[error("Process guid should be non empty string")]
    InvalidProcessGuid,

    #[error("Index should be a non-negative integer")]
    InvalidIndex,

    #[error("definition ID should be non empty string")]
    InvalidDefinitionId,

    /// Inline or file spec that is not a JSON object
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// `@FILE` spec that cannot be read
    #[error("Spec file '{path}' could not be read: {reason}")]
    SpecFile { path: String, reason: String },
}

impl CommandError {
    /// Create a spec file error from the I/O failure behind it
    pub fn spec_file<P: Into<String>>(path: P, source: &std::io::Error) -> Self {
        Self::SpecFile {
            path: path.into(),
            reason: source.to_string(),
        }
    }
}
