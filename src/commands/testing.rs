// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! In-memory clients for command tests

use crate::client::bbs::{
    ActualLrpFilter, BbsClient, DesiredLrpFilter, LrpEvent, LrpEventSource,
};
use crate::client::error::{ApiResponseError, ClientError};
use crate::client::locket::LocketClient;
use crate::output::OutputHandler;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

pub fn backend_error(error_type: &str, message: &str) -> ClientError {
    ApiResponseError::from_envelope(
        200,
        &json!({"type": error_type, "message": message}),
    )
    .into()
}

pub fn output() -> OutputHandler<Vec<u8>> {
    OutputHandler::with_writer(Vec::new())
}

pub fn lines(output: OutputHandler<Vec<u8>>) -> Vec<Value> {
    let written = String::from_utf8(output.into_inner()).unwrap(); //#[allow_ci]
    written
        .lines()
        .map(|line| serde_json::from_str(line).unwrap()) //#[allow_ci]
        .collect()
}

/// Scripted event source that remembers whether it was closed
#[derive(Debug, Default)]
pub struct FakeEvents {
    pub events: VecDeque<Result<LrpEvent, ClientError>>,
    pub closed: Rc<Cell<u32>>,
}

impl LrpEventSource for FakeEvents {
    async fn next(&mut self) -> Result<Option<LrpEvent>, ClientError> {
        match self.events.pop_front() {
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}

/// BBS client answering every list call with `list` and every get call
/// with `object`, or failing every call with `error_type` when set
#[derive(Debug, Default)]
pub struct FakeBbsClient {
    pub list: Vec<Value>,
    pub object: Value,
    pub error_type: Option<String>,
    pub events: RefCell<Option<FakeEvents>>,
    pub calls: RefCell<Vec<(String, Value)>>,
}

impl FakeBbsClient {
    pub fn failing(error_type: &str) -> Self {
        Self {
            error_type: Some(error_type.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    fn call(&self, name: &str, args: Value) -> Result<(), ClientError> {
        self.calls.borrow_mut().push((name.to_string(), args));
        match &self.error_type {
            Some(error_type) => Err(backend_error(error_type, "fake failure")),
            None => Ok(()),
        }
    }
}

impl BbsClient for FakeBbsClient {
    type Events = FakeEvents;

    async fn domains(&self) -> Result<Vec<Value>, ClientError> {
        self.call("domains", Value::Null)?;
        Ok(self.list.clone())
    }

    async fn actual_lrps(
        &self,
        filter: &ActualLrpFilter,
    ) -> Result<Vec<Value>, ClientError> {
        self.call("actual_lrps", serde_json::to_value(filter)?)?;
        Ok(self.list.clone())
    }

    async fn actual_lrps_by_process_guid(
        &self,
        process_guid: &str,
    ) -> Result<Vec<Value>, ClientError> {
        self.call("actual_lrps_by_process_guid", json!(process_guid))?;
        Ok(self.list.clone())
    }

    async fn actual_lrp_by_process_guid_and_index(
        &self,
        process_guid: &str,
        index: u32,
    ) -> Result<Value, ClientError> {
        self.call(
            "actual_lrp_by_process_guid_and_index",
            json!([process_guid, index]),
        )?;
        Ok(self.object.clone())
    }

    async fn desired_lrps(
        &self,
        filter: &DesiredLrpFilter,
    ) -> Result<Vec<Value>, ClientError> {
        self.call("desired_lrps", serde_json::to_value(filter)?)?;
        Ok(self.list.clone())
    }

    async fn desired_lrp_by_process_guid(
        &self,
        process_guid: &str,
    ) -> Result<Value, ClientError> {
        self.call("desired_lrp_by_process_guid", json!(process_guid))?;
        Ok(self.object.clone())
    }

    async fn desired_lrp_scheduling_infos(
        &self,
        filter: &DesiredLrpFilter,
    ) -> Result<Vec<Value>, ClientError> {
        self.call("desired_lrp_scheduling_infos", serde_json::to_value(filter)?)?;
        Ok(self.list.clone())
    }

    async fn desire_lrp(&self, desired_lrp: &Value) -> Result<(), ClientError> {
        self.call("desire_lrp", desired_lrp.clone())
    }

    async fn lrp_deployments(
        &self,
        deployment_ids: &[String],
    ) -> Result<Vec<Value>, ClientError> {
        self.call("lrp_deployments", json!(deployment_ids))?;
        Ok(self.list.clone())
    }

    async fn create_lrp_deployment(
        &self,
        deployment: &Value,
    ) -> Result<(), ClientError> {
        self.call("create_lrp_deployment", deployment.clone())
    }

    async fn update_lrp_deployment(
        &self,
        process_guid: &str,
        update: &Value,
    ) -> Result<(), ClientError> {
        self.call("update_lrp_deployment", json!([process_guid, update]))
    }

    async fn delete_lrp_deployment(
        &self,
        process_guid: &str,
    ) -> Result<(), ClientError> {
        self.call("delete_lrp_deployment", json!(process_guid))
    }

    async fn activate_lrp_definition(
        &self,
        process_guid: &str,
        definition_id: &str,
    ) -> Result<(), ClientError> {
        self.call(
            "activate_lrp_definition",
            json!([process_guid, definition_id]),
        )
    }

    async fn subscribe_to_lrp_events(
        &self,
        cell_id: &str,
    ) -> Result<FakeEvents, ClientError> {
        self.call("subscribe_to_lrp_events", json!(cell_id))?;
        Ok(self.events.borrow_mut().take().unwrap_or_default())
    }
}

/// Locket client returning `resources` for every resource type
#[derive(Debug, Default)]
pub struct FakeLocketClient {
    pub resources: Vec<Value>,
    pub error_type: Option<String>,
    pub requested: RefCell<Vec<String>>,
}

impl LocketClient for FakeLocketClient {
    async fn fetch_all(
        &self,
        resource_type: &str,
    ) -> Result<Vec<Value>, ClientError> {
        self.requested.borrow_mut().push(resource_type.to_string());
        match &self.error_type {
            Some(error_type) => Err(backend_error(error_type, "fake failure")),
            None => Ok(self.resources.clone()),
        }
    }
}
