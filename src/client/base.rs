// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Base client functionality shared by the BBS and Locket clients
//!
//! Both services take a JSON request body on `POST` and answer with a JSON
//! object. A failed call either carries an `"error": {"type", "message"}`
//! object or comes back with a non-success status. [`BaseClient`] sends
//! requests exactly once and turns either failure into
//! [`ClientError::Api`].

use crate::client::error::{ApiResponseError, ClientError};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// HTTP plumbing shared by service clients
#[derive(Debug, Clone)]
pub struct BaseClient {
    /// The underlying HTTP client
    pub client: reqwest::Client,
    /// Base URL for the service, without a trailing slash
    pub base_url: String,
    /// Whole-request timeout for unary calls. Streams are not bounded by it.
    pub request_timeout: Option<Duration>,
}

impl BaseClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// POST a JSON body to `route` and return the decoded response object
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<Value, ClientError> {
        let url = self.url(route);
        debug!("POST {url}");

        let mut request = self.client.post(&url).json(body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// POST a JSON body and hand back the open response for streaming
    ///
    /// The request timeout is not applied, the response body may stay open
    /// for as long as the server keeps sending.
    ///
    /// Error responses are consumed and converted like in [`Self::post`].
    pub async fn post_stream<B: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.url(route);
        debug!("POST {url} (stream)");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match self.handle_response(response).await {
            Err(e) => Err(e),
            Ok(_) => Err(ApiResponseError::ServerError {
                status: status.as_u16(),
                message: "event subscription rejected".to_string(),
                response: None,
            }
            .into()),
        }
    }

    /// Decode a response and surface backend errors
    ///
    /// - An `"error"` object in the body becomes [`ApiResponseError::Backend`]
    ///   whatever the status
    /// - Any other non-success status becomes
    ///   [`ApiResponseError::ServerError`]
    /// - An empty success body decodes as an empty object
    pub async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Value, ClientError> {
        let status = response.status();
        let response_text = response.text().await?;

        let body = if response_text.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            match serde_json::from_str::<Value>(&response_text) {
                Ok(value) => value,
                Err(e) if status.is_success() => return Err(ClientError::Json(e)),
                Err(_) => Value::String(response_text.clone()),
            }
        };

        if let Some(error) = body.get("error").filter(|e| e.is_object()) {
            return Err(
                ApiResponseError::from_envelope(status.as_u16(), error).into()
            );
        }

        if !status.is_success() {
            let message = match &body {
                Value::String(text) => text.clone(),
                _ => status
                    .canonical_reason()
                    .unwrap_or("HTTP error")
                    .to_string(),
            };
            return Err(ApiResponseError::ServerError {
                status: status.as_u16(),
                message,
                response: Some(body),
            }
            .into());
        }

        Ok(body)
    }
}

/// Take a list payload out of a response object
///
/// Empty lists may be omitted by the server, so a missing field is an empty
/// list.
pub fn take_list(mut body: Value, field: &str) -> Result<Vec<Value>, ClientError> {
    match body.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ApiResponseError::InvalidField {
            field: field.to_string(),
        }
        .into()),
    }
}

/// Take a single object payload out of a response object
pub fn take_object(mut body: Value, field: &str) -> Result<Value, ClientError> {
    match body.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Err(ApiResponseError::MissingField {
            field: field.to_string(),
        }
        .into()),
        Some(value) => Ok(value),
    }
}
