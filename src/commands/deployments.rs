// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! LRP deployment commands

use crate::client::bbs::BbsClient;
use crate::commands::error::CommandError;
use crate::commands::{read_spec, validate_argument_count, validate_process_guid};
use crate::error::CfdotError;
use crate::output::OutputHandler;
use log::info;
use serde_json::Value;
use std::io::Write;

/// Arguments of `update-lrp-deployment`
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentUpdate {
    pub process_guid: String,
    pub update: Value,
}

/// Arguments of `activate-lrp-definition`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionActivation {
    pub process_guid: String,
    pub definition_id: String,
}

pub fn validate_create_arguments(args: &[String]) -> Result<Value, CommandError> {
    if args.len() != 1 {
        return Err(CommandError::MissingSpec);
    }
    read_spec(&args[0])
}

pub fn validate_update_arguments(
    args: &[String],
) -> Result<DeploymentUpdate, CommandError> {
    validate_argument_count(args, 2)?;
    validate_process_guid(&args[0])?;

    Ok(DeploymentUpdate {
        process_guid: args[0].clone(),
        update: read_spec(&args[1])?,
    })
}

pub fn validate_delete_arguments(args: &[String]) -> Result<String, CommandError> {
    validate_argument_count(args, 1)?;
    validate_process_guid(&args[0])?;
    Ok(args[0].clone())
}

pub fn validate_activate_arguments(
    args: &[String],
) -> Result<DefinitionActivation, CommandError> {
    validate_argument_count(args, 2)?;
    validate_process_guid(&args[0])?;
    if args[1].is_empty() {
        return Err(CommandError::InvalidDefinitionId);
    }

    Ok(DefinitionActivation {
        process_guid: args[0].clone(),
        definition_id: args[1].clone(),
    })
}

/// List deployments, all of them when no ids are given
pub async fn list<C: BbsClient, W: Write>(
    client: &C,
    deployment_ids: &[String],
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    let deployments = client.lrp_deployments(deployment_ids).await?;
    output.records(&deployments)
}

pub async fn create<C: BbsClient>(
    client: &C,
    deployment: &Value,
) -> Result<(), CfdotError> {
    client.create_lrp_deployment(deployment).await?;
    info!("LRP deployment created");
    Ok(())
}

pub async fn update<C: BbsClient>(
    client: &C,
    update: &DeploymentUpdate,
) -> Result<(), CfdotError> {
    client
        .update_lrp_deployment(&update.process_guid, &update.update)
        .await?;
    info!("LRP deployment {} updated", update.process_guid);
    Ok(())
}

pub async fn delete<C: BbsClient>(
    client: &C,
    process_guid: &str,
) -> Result<(), CfdotError> {
    client.delete_lrp_deployment(process_guid).await?;
    info!("LRP deployment {process_guid} deleted");
    Ok(())
}

pub async fn activate<C: BbsClient>(
    client: &C,
    activation: &DefinitionActivation,
) -> Result<(), CfdotError> {
    client
        .activate_lrp_definition(
            &activation.process_guid,
            &activation.definition_id,
        )
        .await?;
    info!(
        "Definition {} of {} activated",
        activation.definition_id, activation.process_guid
    );
    Ok(())
}
