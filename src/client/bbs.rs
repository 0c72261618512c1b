// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! BBS client
//!
//! [`BbsClient`] lists one method per RPC cfdot issues against the BBS. LRP
//! records, deployments and events are handled as opaque JSON values.
//! [`HttpBbsClient`] is the real implementation; commands are generic over
//! the trait.
//!
//! Event subscription returns an [`EventStream`] reading Server-Sent Events
//! one at a time. The stream must be closed once the caller is done with it.
//! Dropping it closes it too.

use crate::client::base::{take_list, take_object, BaseClient};
use crate::client::error::ClientError;
use log::debug;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

const DOMAINS_ROUTE: &str = "/v1/domains/list";
const ACTUAL_LRPS_ROUTE: &str = "/v1/actual_lrps/list";
const ACTUAL_LRP_GROUPS_BY_GUID_ROUTE: &str =
    "/v1/actual_lrp_groups/list_by_process_guid";
const ACTUAL_LRP_GROUP_BY_GUID_AND_INDEX_ROUTE: &str =
    "/v1/actual_lrp_groups/get_by_process_guid_and_index";
const DESIRED_LRPS_ROUTE: &str = "/v1/desired_lrps/list";
const DESIRED_LRP_BY_GUID_ROUTE: &str = "/v1/desired_lrps/get_by_process_guid";
const SCHEDULING_INFOS_ROUTE: &str = "/v1/desired_lrp_scheduling_infos/list";
const DESIRE_LRP_ROUTE: &str = "/v1/desired_lrp/desire";
const LRP_DEPLOYMENTS_ROUTE: &str = "/v1/lrp_deployments/list";
const CREATE_LRP_DEPLOYMENT_ROUTE: &str = "/v1/lrp_deployments/create";
const UPDATE_LRP_DEPLOYMENT_ROUTE: &str = "/v1/lrp_deployments/update";
const DELETE_LRP_DEPLOYMENT_ROUTE: &str = "/v1/lrp_deployments/delete";
const ACTIVATE_LRP_DEFINITION_ROUTE: &str = "/v1/lrp_deployments/activate";
const LRP_EVENTS_ROUTE: &str = "/v1/events/lrp_instances.r1";

/// Filter for listing actual LRPs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActualLrpFilter {
    pub domain: String,
    pub cell_id: String,
}

/// Filter for listing desired LRPs and their scheduling infos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DesiredLrpFilter {
    pub domain: String,
}

/// One event from the LRP event stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LrpEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
}

/// A pull-based source of LRP events
#[allow(async_fn_in_trait)]
pub trait LrpEventSource {
    /// The next event, or `None` at end of stream
    async fn next(&mut self) -> Result<Option<LrpEvent>, ClientError>;

    /// Release the underlying connection. Safe to call more than once.
    fn close(&mut self);
}

/// RPCs issued against the BBS
#[allow(async_fn_in_trait)]
pub trait BbsClient {
    type Events: LrpEventSource;

    async fn domains(&self) -> Result<Vec<Value>, ClientError>;

    async fn actual_lrps(
        &self,
        filter: &ActualLrpFilter,
    ) -> Result<Vec<Value>, ClientError>;

    async fn actual_lrps_by_process_guid(
        &self,
        process_guid: &str,
    ) -> Result<Vec<Value>, ClientError>;

    async fn actual_lrp_by_process_guid_and_index(
        &self,
        process_guid: &str,
        index: u32,
    ) -> Result<Value, ClientError>;

    async fn desired_lrps(
        &self,
        filter: &DesiredLrpFilter,
    ) -> Result<Vec<Value>, ClientError>;

    async fn desired_lrp_by_process_guid(
        &self,
        process_guid: &str,
    ) -> Result<Value, ClientError>;

    async fn desired_lrp_scheduling_infos(
        &self,
        filter: &DesiredLrpFilter,
    ) -> Result<Vec<Value>, ClientError>;

    async fn desire_lrp(&self, desired_lrp: &Value) -> Result<(), ClientError>;

    async fn lrp_deployments(
        &self,
        deployment_ids: &[String],
    ) -> Result<Vec<Value>, ClientError>;

    async fn create_lrp_deployment(
        &self,
        deployment: &Value,
    ) -> Result<(), ClientError>;

    async fn update_lrp_deployment(
        &self,
        process_guid: &str,
        update: &Value,
    ) -> Result<(), ClientError>;

    async fn delete_lrp_deployment(
        &self,
        process_guid: &str,
    ) -> Result<(), ClientError>;

    async fn activate_lrp_definition(
        &self,
        process_guid: &str,
        definition_id: &str,
    ) -> Result<(), ClientError>;

    async fn subscribe_to_lrp_events(
        &self,
        cell_id: &str,
    ) -> Result<Self::Events, ClientError>;
}

/// BBS client speaking JSON over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpBbsClient {
    base: BaseClient,
}

impl HttpBbsClient {
    pub fn new(http: reqwest::Client, url: &str) -> Self {
        Self {
            base: BaseClient::new(http, url),
        }
    }

    /// Bound every unary call by `timeout`
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.base = self.base.with_request_timeout(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base.base_url
    }
}

impl BbsClient for HttpBbsClient {
    type Events = EventStream;

    async fn domains(&self) -> Result<Vec<Value>, ClientError> {
        let body = self.base.post(DOMAINS_ROUTE, &json!({})).await?;
        take_list(body, "domains")
    }

    async fn actual_lrps(
        &self,
        filter: &ActualLrpFilter,
    ) -> Result<Vec<Value>, ClientError> {
        let body = self.base.post(ACTUAL_LRPS_ROUTE, filter).await?;
        take_list(body, "actual_lrps")
    }

    async fn actual_lrps_by_process_guid(
        &self,
        process_guid: &str,
    ) -> Result<Vec<Value>, ClientError> {
        let body = self
            .base
            .post(
                ACTUAL_LRP_GROUPS_BY_GUID_ROUTE,
                &json!({ "process_guid": process_guid }),
            )
            .await?;
        take_list(body, "actual_lrp_groups")
    }

    async fn actual_lrp_by_process_guid_and_index(
        &self,
        process_guid: &str,
        index: u32,
    ) -> Result<Value, ClientError> {
        let body = self
            .base
            .post(
                ACTUAL_LRP_GROUP_BY_GUID_AND_INDEX_ROUTE,
                &json!({ "process_guid": process_guid, "index": index }),
            )
            .await?;
        take_object(body, "actual_lrp_group")
    }

    async fn desired_lrps(
        &self,
        filter: &DesiredLrpFilter,
    ) -> Result<Vec<Value>, ClientError> {
        let body = self.base.post(DESIRED_LRPS_ROUTE, filter).await?;
        take_list(body, "desired_lrps")
    }

    async fn desired_lrp_by_process_guid(
        &self,
        process_guid: &str,
    ) -> Result<Value, ClientError> {
        let body = self
            .base
            .post(
                DESIRED_LRP_BY_GUID_ROUTE,
                &json!({ "process_guid": process_guid }),
            )
            .await?;
        take_object(body, "desired_lrp")
    }

    async fn desired_lrp_scheduling_infos(
        &self,
        filter: &DesiredLrpFilter,
    ) -> Result<Vec<Value>, ClientError> {
        let body = self.base.post(SCHEDULING_INFOS_ROUTE, filter).await?;
        take_list(body, "desired_lrp_scheduling_infos")
    }

    async fn desire_lrp(&self, desired_lrp: &Value) -> Result<(), ClientError> {
        self.base
            .post(DESIRE_LRP_ROUTE, &json!({ "desired_lrp": desired_lrp }))
            .await?;
        Ok(())
    }

    async fn lrp_deployments(
        &self,
        deployment_ids: &[String],
    ) -> Result<Vec<Value>, ClientError> {
        let body = self
            .base
            .post(LRP_DEPLOYMENTS_ROUTE, &json!({ "ids": deployment_ids }))
            .await?;
        take_list(body, "lrp_deployments")
    }

    async fn create_lrp_deployment(
        &self,
        deployment: &Value,
    ) -> Result<(), ClientError> {
        self.base
            .post(
                CREATE_LRP_DEPLOYMENT_ROUTE,
                &json!({ "lrp_deployment": deployment }),
            )
            .await?;
        Ok(())
    }

    async fn update_lrp_deployment(
        &self,
        process_guid: &str,
        update: &Value,
    ) -> Result<(), ClientError> {
        self.base
            .post(
                UPDATE_LRP_DEPLOYMENT_ROUTE,
                &json!({ "process_guid": process_guid, "update": update }),
            )
            .await?;
        Ok(())
    }

    async fn delete_lrp_deployment(
        &self,
        process_guid: &str,
    ) -> Result<(), ClientError> {
        self.base
            .post(
                DELETE_LRP_DEPLOYMENT_ROUTE,
                &json!({ "process_guid": process_guid }),
            )
            .await?;
        Ok(())
    }

    async fn activate_lrp_definition(
        &self,
        process_guid: &str,
        definition_id: &str,
    ) -> Result<(), ClientError> {
        self.base
            .post(
                ACTIVATE_LRP_DEFINITION_ROUTE,
                &json!({
                    "process_guid": process_guid,
                    "definition_id": definition_id,
                }),
            )
            .await?;
        Ok(())
    }

    async fn subscribe_to_lrp_events(
        &self,
        cell_id: &str,
    ) -> Result<EventStream, ClientError> {
        let response = self
            .base
            .post_stream(LRP_EVENTS_ROUTE, &json!({ "cell_id": cell_id }))
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("text/event-stream") {
            return Err(ClientError::stream(format!(
                "expected an event stream, got content type '{content_type}'"
            )));
        }

        Ok(EventStream::new(response))
    }
}

/// Server-Sent Events reader over an open HTTP response
#[derive(Debug)]
pub struct EventStream {
    response: Option<reqwest::Response>,
    buffer: Vec<u8>,
}

impl EventStream {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            buffer: Vec::new(),
        }
    }

    /// Pop the next complete `\n\n`-terminated block from the buffer
    fn take_block(&mut self) -> Option<String> {
        let end = self.buffer.windows(2).position(|w| w == b"\n\n")?;
        let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
        Some(String::from_utf8_lossy(&block[..end]).into_owned())
    }
}

/// Parse one SSE block. Blocks without data are keep-alives.
fn parse_event(block: &str) -> Option<LrpEvent> {
    let mut event_type = None;
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event_type = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return None;
    }

    let raw = data.join("\n");
    let data = serde_json::from_str(&raw).unwrap_or(Value::String(raw));

    Some(LrpEvent {
        event_type: event_type.unwrap_or_else(|| "message".to_string()),
        data,
    })
}

impl LrpEventSource for EventStream {
    async fn next(&mut self) -> Result<Option<LrpEvent>, ClientError> {
        loop {
            while let Some(block) = self.take_block() {
                if let Some(event) = parse_event(&block) {
                    return Ok(Some(event));
                }
            }

            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };

            match response.chunk().await? {
                Some(chunk) => {
                    self.buffer.extend(chunk.iter().filter(|b| **b != b'\r'));
                }
                None => {
                    debug!("LRP event stream ended");
                    self.response = None;
                    if self.buffer.iter().any(|b| !b.is_ascii_whitespace()) {
                        self.buffer.extend_from_slice(b"\n\n");
                    }
                }
            }
        }
    }

    fn close(&mut self) {
        if self.response.take().is_some() {
            debug!("Closing LRP event stream");
        }
        self.buffer.clear();
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}
