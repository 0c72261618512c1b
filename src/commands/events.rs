// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! `lrp-events`: follow the BBS LRP event stream
//!
//! Events are written one per line as they arrive until the server ends the
//! stream or the connection fails. The subscription is closed on every exit
//! path.

use crate::client::bbs::{BbsClient, LrpEventSource};
use crate::commands::error::CommandError;
use crate::commands::validate_no_arguments;
use crate::error::CfdotError;
use crate::output::OutputHandler;
use log::{debug, info};
use std::io::Write;

pub fn validate_arguments(args: &[String]) -> Result<(), CommandError> {
    validate_no_arguments(args)
}

pub async fn execute<C: BbsClient, W: Write>(
    client: &C,
    cell_id: &str,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let mut events = client.subscribe_to_lrp_events(cell_id).await?;
    info!("Subscribed to LRP events");

    let result = drain(&mut events, output).await;
    events.close();
    result
}

async fn drain<E: LrpEventSource, W: Write>(
    events: &mut E,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let mut count: u64 = 0;
    while let Some(event) = events.next().await? {
        output.record(&event)?;
        count += 1;
    }
    debug!("Event stream ended after {count} events");
    Ok(())
}
