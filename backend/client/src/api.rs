use std::collections::BTreeSet;

use async_trait::async_trait;
use catalog::{
    Category, Group, Location,
    payloads::{CompletionRecord, ErrorBody, Registration, ToggleRequest, ToggleResponse},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
}

/// Server operations a map session needs.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Creates the caller's account on first use. Safe to repeat.
    async fn register(&self) -> Result<Registration, ClientError>;

    async fn groups(&self) -> Result<Vec<Group>, ClientError>;

    async fn categories(&self) -> Result<Vec<Category>, ClientError>;

    async fn locations(&self) -> Result<Vec<Location>, ClientError>;

    async fn completed_ids(&self) -> Result<BTreeSet<u32>, ClientError>;

    async fn toggle(&self, location_id: u32) -> Result<CompletionRecord, ClientError>;
}

/// Talks to the server as the proxy would, forwarding the caller identity.
pub struct HttpApi {
    client: Client,
    base_url: String,
    identity_header: String,
    identity: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            identity_header: "x-user-id".to_string(),
            identity: identity.into(),
        }
    }

    pub fn with_identity_header(mut self, header: impl Into<String>) -> Self {
        self.identity_header = header.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(self.identity_header.as_str(), self.identity.as_str())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = check(request.send().await?).await?;

        Ok(response.json().await?)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    Err(ClientError::Status { status, message })
}

#[async_trait]
impl TrackerApi for HttpApi {
    async fn register(&self) -> Result<Registration, ClientError> {
        self.fetch(self.authorized(self.client.post(self.url("/users")))).await
    }

    async fn groups(&self) -> Result<Vec<Group>, ClientError> {
        self.fetch(self.client.get(self.url("/groups"))).await
    }

    async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.fetch(self.client.get(self.url("/categories"))).await
    }

    async fn locations(&self) -> Result<Vec<Location>, ClientError> {
        self.fetch(self.client.get(self.url("/locations"))).await
    }

    async fn completed_ids(&self) -> Result<BTreeSet<u32>, ClientError> {
        let ids: Vec<u32> = self
            .fetch(self.authorized(self.client.get(self.url("/completions"))))
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn toggle(&self, location_id: u32) -> Result<CompletionRecord, ClientError> {
        let request = self
            .authorized(self.client.post(self.url("/complete")))
            .json(&ToggleRequest {
                location_id: location_id.into(),
            });
        let response: ToggleResponse = self.fetch(request).await?;

        Ok(response.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let api = HttpApi::new("http://localhost:1111/", "user_1");

        assert_eq!(api.url("/complete"), "http://localhost:1111/complete");
        assert_eq!(api.identity_header, "x-user-id");

        let api = api.with_identity_header("x-clerk-user");
        assert_eq!(api.identity_header, "x-clerk-user");
    }
}
