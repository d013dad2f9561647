//! Admin API client for one mock-server instance

use super::error::AdminError;
use futures_util::future::join_all;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use stubdeck_common::constants::ADMIN_PREFIX;
use stubdeck_common::{AdminErrorBody, MappingsEnvelope, RequestsEnvelope, StubMapping};

/// How much of the request journal to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    /// The most recent `n` entries
    Limited(usize),
    /// Every logged entry
    All,
}

/// Client bound to one instance's base URL
#[derive(Clone)]
pub struct AdminClient {
    base_url: String,
    client: Client,
}

impl AdminClient {
    /// Create a client for `base_url` (a trailing `/` is ignored)
    pub fn new(base_url: &str) -> Result<Self, AdminError> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, ADMIN_PREFIX, path)
    }

    /// GET /__admin/requests
    pub async fn list_requests(&self, scope: RequestScope) -> Result<RequestsEnvelope, AdminError> {
        let mut request = self.client.get(self.endpoint("/requests"));
        if let RequestScope::Limited(limit) = scope {
            request = request.query(&[("limit", limit)]);
        }
        let response = check(request.send().await?).await?;
        let envelope: RequestsEnvelope = response.json().await?;
        tracing::debug!(
            base_url = %self.base_url,
            returned = envelope.requests.len(),
            total = envelope.meta.total,
            "Fetched request journal"
        );
        Ok(envelope)
    }

    /// GET /__admin/mappings
    pub async fn list_mappings(&self) -> Result<MappingsEnvelope, AdminError> {
        let response = check(self.client.get(self.endpoint("/mappings")).send().await?).await?;
        let envelope: MappingsEnvelope = response.json().await?;
        tracing::debug!(
            base_url = %self.base_url,
            returned = envelope.mappings.len(),
            "Fetched stub mappings"
        );
        Ok(envelope)
    }

    /// POST /__admin/mappings
    pub async fn create_mapping(&self, mapping: &StubMapping) -> Result<StubMapping, AdminError> {
        let response = self
            .client
            .post(self.endpoint("/mappings"))
            .json(mapping)
            .send()
            .await?;
        let created: StubMapping = check(response).await?.json().await?;
        tracing::debug!(base_url = %self.base_url, id = %created.id, "Created mapping");
        Ok(created)
    }

    /// PUT /__admin/mappings/{id}
    pub async fn update_mapping(&self, mapping: &StubMapping) -> Result<StubMapping, AdminError> {
        let response = self
            .client
            .put(self.endpoint(&format!("/mappings/{}", mapping.id)))
            .json(mapping)
            .send()
            .await?;
        let updated: StubMapping = check(response).await?.json().await?;
        tracing::debug!(base_url = %self.base_url, id = %updated.id, "Updated mapping");
        Ok(updated)
    }

    /// DELETE /__admin/mappings/{id}
    pub async fn delete_mapping(&self, id: &str) -> Result<(), AdminError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/mappings/{}", id)))
            .send()
            .await?;
        check(response).await?;
        tracing::debug!(base_url = %self.base_url, id, "Deleted mapping");
        Ok(())
    }

    /// Delete every id concurrently and report each outcome
    ///
    /// Waits for all calls; nothing is retried.
    pub async fn delete_mappings(&self, ids: &[String]) -> Vec<(String, Result<(), AdminError>)> {
        let results = join_all(ids.iter().map(|id| self.delete_mapping(id))).await;
        ids.iter().cloned().zip(results).collect()
    }

    /// POST /__admin/mappings/import
    pub async fn import_mappings(&self, document: &Value) -> Result<(), AdminError> {
        let response = self
            .client
            .post(self.endpoint("/mappings/import"))
            .json(document)
            .send()
            .await?;
        check(response).await?;
        tracing::debug!(base_url = %self.base_url, "Imported mappings");
        Ok(())
    }
}

/// Turn a non-success response into an application error
async fn check(response: Response) -> Result<Response, AdminError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AdminErrorBody>(&text)
        .ok()
        .and_then(|body| body.error);

    tracing::debug!(status = status.as_u16(), ?message, "Admin call failed");
    Err(AdminError::application(status.as_u16(), message))
}
