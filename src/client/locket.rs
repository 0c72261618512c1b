// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Locket client

use crate::client::base::{take_list, BaseClient};
use crate::client::error::ClientError;
use serde_json::{json, Value};
use std::time::Duration;

const FETCH_ALL_ROUTE: &str = "/v1/locks/fetch_all";

/// Resource type of a held lock
pub const LOCK_TYPE: &str = "lock";
/// Resource type of a presence registration
pub const PRESENCE_TYPE: &str = "presence";

/// RPCs issued against Locket
#[allow(async_fn_in_trait)]
pub trait LocketClient {
    /// All resources of the given type
    async fn fetch_all(
        &self,
        resource_type: &str,
    ) -> Result<Vec<Value>, ClientError>;
}

/// Locket client speaking JSON over HTTPS
#[derive(Debug, Clone)]
pub struct HttpLocketClient {
    base: BaseClient,
}

impl HttpLocketClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            base: BaseClient::new(http, base_url),
        }
    }

    /// Bound every unary call by `timeout`
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.base = self.base.with_request_timeout(timeout);
        self
    }
}

impl LocketClient for HttpLocketClient {
    async fn fetch_all(
        &self,
        resource_type: &str,
    ) -> Result<Vec<Value>, ClientError> {
        let body = self
            .base
            .post(FETCH_ALL_ROUTE, &json!({ "type": resource_type }))
            .await?;
        take_list(body, "resources")
    }
}
