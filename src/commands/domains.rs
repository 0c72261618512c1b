// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! `domains`: list the fresh domains known to the BBS

use crate::client::bbs::BbsClient;
use crate::commands::error::CommandError;
use crate::commands::validate_no_arguments;
use crate::error::CfdotError;
use crate::output::OutputHandler;
use log::debug;
use std::io::Write;

pub fn validate_arguments(args: &[String]) -> Result<(), CommandError> {
    validate_no_arguments(args)
}

/// Print each domain as a JSON string on its own line
pub async fn execute<C: BbsClient, W: Write>(
    client: &C,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let domains = client.domains().await?;
    debug!("Fetched {} domains", domains.len());
    output.records(&domains)
}
