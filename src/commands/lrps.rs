// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Actual and desired LRP commands
//!
//! - `actual-lrps`: list actual LRPs, optionally filtered by domain and cell
//! - `actual-lrps-for-guid`: list the actual LRPs of one process, or fetch
//!   a single instance when an index is given
//! - `desired-lrps`, `desired-lrp`, `desired-lrp-scheduling-infos`
//! - `create-desired-lrp`: desire an LRP from an inline or `@FILE` spec

use crate::client::bbs::{ActualLrpFilter, BbsClient, DesiredLrpFilter};
use crate::commands::error::CommandError;
use crate::commands::{
    read_spec, validate_argument_count, validate_no_arguments,
    validate_process_guid,
};
use crate::error::CfdotError;
use crate::output::OutputHandler;
use log::{debug, info};
use serde_json::Value;
use std::io::Write;

/// Target of `actual-lrps-for-guid`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualLrpQuery {
    pub process_guid: String,
    pub index: Option<u32>,
}

pub fn validate_actual_lrps_arguments(
    args: &[String],
) -> Result<(), CommandError> {
    validate_no_arguments(args)
}

/// Check the process guid and the optional `--index` value
///
/// An empty index means no index was requested.
pub fn validate_actual_lrps_for_guid_arguments(
    args: &[String],
    index: Option<&str>,
) -> Result<ActualLrpQuery, CommandError> {
    validate_argument_count(args, 1)?;
    let process_guid = &args[0];
    validate_process_guid(process_guid)?;

    let index = match index {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| CommandError::InvalidIndex)?,
        ),
    };

    Ok(ActualLrpQuery {
        process_guid: process_guid.clone(),
        index,
    })
}

pub fn validate_desired_lrps_arguments(
    args: &[String],
) -> Result<(), CommandError> {
    validate_no_arguments(args)
}

pub fn validate_desired_lrp_arguments(
    args: &[String],
) -> Result<String, CommandError> {
    validate_argument_count(args, 1)?;
    validate_process_guid(&args[0])?;
    Ok(args[0].clone())
}

pub fn validate_scheduling_infos_arguments(
    args: &[String],
) -> Result<(), CommandError> {
    validate_no_arguments(args)
}

pub fn validate_create_desired_lrp_arguments(
    args: &[String],
) -> Result<Value, CommandError> {
    if args.len() != 1 {
        return Err(CommandError::MissingSpec);
    }
    read_spec(&args[0])
}

pub async fn actual_lrps<C: BbsClient, W: Write>(
    client: &C,
    filter: &ActualLrpFilter,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let lrps = client.actual_lrps(filter).await?;
    debug!(
        "Fetched {} actual LRPs (domain: '{}', cell: '{}')",
        lrps.len(),
        filter.domain,
        filter.cell_id
    );
    output.records(&lrps)
}

pub async fn actual_lrps_for_guid<C: BbsClient, W: Write>(
    client: &C,
    query: &ActualLrpQuery,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    match query.index {
        Some(index) => {
            let lrp = client
                .actual_lrp_by_process_guid_and_index(&query.process_guid, index)
                .await?;
            output.record(&lrp)
        }
        None => {
            let lrps = client
                .actual_lrps_by_process_guid(&query.process_guid)
                .await?;
            output.records(&lrps)
        }
    }
}

pub async fn desired_lrps<C: BbsClient, W: Write>(
    client: &C,
    filter: &DesiredLrpFilter,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let lrps = client.desired_lrps(filter).await?;
    debug!("Fetched {} desired LRPs", lrps.len());
    output.records(&lrps)
}

pub async fn desired_lrp<C: BbsClient, W: Write>(
    client: &C,
    process_guid: &str,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let lrp = client.desired_lrp_by_process_guid(process_guid).await?;
    output.record(&lrp)
}

pub async fn desired_lrp_scheduling_infos<C: BbsClient, W: Write>(
    client: &C,
    filter: &DesiredLrpFilter,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let infos = client.desired_lrp_scheduling_infos(filter).await?;
    output.records(&infos)
}

/// Desire an LRP. Nothing is printed on success.
pub async fn create_desired_lrp<C: BbsClient>(
    client: &C,
    desired_lrp: &Value,
) -> Result<(), CfdotError> {
    client.desire_lrp(desired_lrp).await?;
    info!("Desired LRP created");
    Ok(())
}
