// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Command implementations for cfdot
//!
//! Each command validates its positional arguments first, then issues
//! exactly one RPC through a client trait and writes the result as NDJSON.

pub mod deployments;
pub mod domains;
pub mod error;
pub mod events;
pub mod locks;
pub mod lrps;

#[cfg(test)]
mod testing;

use self::error::CommandError;
use serde::de::Error as _;
use serde_json::Value;

/// Reject any positional argument
pub fn validate_no_arguments(args: &[String]) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::ExtraArguments)
    }
}

/// Check that exactly `count` positional arguments were given
pub fn validate_argument_count(
    args: &[String],
    count: usize,
) -> Result<(), CommandError> {
    if args.len() < count {
        return Err(CommandError::MissingArguments);
    }
    if args.len() > count {
        return Err(CommandError::ExtraArguments);
    }
    Ok(())
}

fn validate_process_guid(value: &str) -> Result<(), CommandError> {
    if value.is_empty() {
        return Err(CommandError::InvalidProcessGuid);
    }
    Ok(())
}

/// Read an entity spec given inline or as `@PATH`
///
/// The spec must be a JSON object.
pub fn read_spec(arg: &str) -> Result<Value, CommandError> {
    let raw = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CommandError::spec_file(path, &e))?,
        None => arg.to_string(),
    };

    let spec: Value =
        serde_json::from_str(&raw).map_err(CommandError::InvalidJson)?;
    if !spec.is_object() {
        return Err(CommandError::InvalidJson(serde_json::Error::custom(
            "expected a JSON object",
        )));
    }

    Ok(spec)
}
