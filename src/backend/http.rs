//! HTTP client for the todo server.

use super::{ApiError, Backend};
use crate::sync::{SyncReport, SyncStatus};
use crate::todo::{Todo, TodoFields, TodoId};
use async_trait::async_trait;
use log::*;
use reqwest::{multipart, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Makes requests to the todo server and conforms responses to local types.
///
pub struct HttpBackend {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Returns a new instance for the given server base URL.
    ///
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        debug!("Initializing HTTP backend for {}...", base_url);
        Ok(HttpBackend {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        trace!("{} {}", method, url);
        self.http_client.request(method, url)
    }

    /// Send the request and decode a successful body as `T`.
    ///
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let error = ApiError::from_payload(status.as_u16(), &body);
            warn!("Request failed with status {}: {}", status, error);
            return Err(error);
        }
        serde_json::from_slice(&body).map_err(|e| {
            error!(
                "Failed to deserialize response: {}. Response body: {}",
                e,
                String::from_utf8_lossy(&body)
            );
            ApiError::from(e)
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.send(self.request(Method::GET, "/api/todos")).await
    }

    async fn create_todo(&self, fields: &TodoFields) -> Result<Todo, ApiError> {
        self.send(self.request(Method::POST, "/api/todos").json(fields))
            .await
    }

    async fn update_todo(&self, id: TodoId, fields: &TodoFields) -> Result<Todo, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/api/todos/{}", id))
                .json(fields),
        )
        .await
    }

    async fn delete_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/api/todos/{}", id)))
            .await
    }

    async fn toggle_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.send(self.request(Method::PATCH, &format!("/api/todos/{}/toggle", id)))
            .await
    }

    async fn upload_attachment(
        &self,
        id: TodoId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Todo, ApiError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = multipart::Form::new().part("file", part);
        self.send(
            self.request(Method::POST, &format!("/api/todos/{}/upload", id))
                .multipart(form),
        )
        .await
    }

    async fn remove_attachment(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/api/todos/{}/attachment", id)))
            .await
    }

    async fn sync(&self) -> Result<SyncReport, ApiError> {
        self.send(self.request(Method::POST, "/api/sync")).await
    }

    async fn sync_status(&self) -> Result<SyncStatus, ApiError> {
        self.send(self.request(Method::GET, "/api/sync/status"))
            .await
    }
}
