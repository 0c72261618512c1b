// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! `locks` and `presences`: list Locket resources

use crate::client::locket::{LocketClient, LOCK_TYPE, PRESENCE_TYPE};
use crate::commands::error::CommandError;
use crate::commands::validate_no_arguments;
use crate::error::CfdotError;
use crate::output::OutputHandler;
use log::debug;
use std::io::Write;

pub fn validate_arguments(args: &[String]) -> Result<(), CommandError> {
    validate_no_arguments(args)
}

pub async fn locks<C: LocketClient, W: Write>(
    client: &C,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    fetch(client, LOCK_TYPE, output).await
}

pub async fn presences<C: LocketClient, W: Write>(
    client: &C,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    fetch(client, PRESENCE_TYPE, output).await
}

async fn fetch<C: LocketClient, W: Write>(
    client: &C,
    resource_type: &str,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let resources = client.fetch_all(resource_type).await?;
    debug!("Fetched {} {resource_type} resources", resources.len());
    output.records(&resources)
}
