use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::Config,
    models::template::{
        ClientIdUpdate, ListQuery, TemplateListResponse, TemplateRecord, TemplateSummary,
        TemplateType, UpsertPayload,
    },
};

const API_KEY_HEADER: &str = "Api-Key";

pub struct IterableClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl IterableClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url = %config.iterable_base_url, "Iterable client initialized");

        Ok(Self {
            http_client,
            base_url: config.iterable_base_url.trim_end_matches('/').to_string(),
            api_key: config.iterable_api_key.clone(),
        })
    }

    pub async fn list_templates(
        &self,
        query: &ListQuery,
        template_type: TemplateType,
    ) -> Result<Vec<TemplateSummary>, Error> {
        let url = format!("{}/api/templates", self.base_url);

        debug!(%template_type, "Listing templates");

        let response = self
            .authorized(self.http_client.get(&url))
            .query(&query.params(template_type))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch {} templates: {}", template_type, e))?;

        let response = Self::check_status(response, &format!("fetch {} templates", template_type)).await?;
        let list: TemplateListResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse template list JSON: {}", e))?;

        Ok(list.templates)
    }

    pub async fn get_template(&self, template_id: u64) -> Result<TemplateRecord, Error> {
        let url = format!("{}/api/templates/email/get", self.base_url);

        debug!(template_id, "Fetching template");

        let response = self
            .authorized(self.http_client.get(&url))
            .query(&[("templateId", template_id)])
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch template {}: {}", template_id, e))?;

        let response = Self::check_status(response, &format!("fetch template {}", template_id)).await?;
        response
            .json::<TemplateRecord>()
            .await
            .map_err(|e| anyhow!("Failed to parse template JSON: {}", e))
    }

    pub async fn upsert_template(&self, payload: &UpsertPayload) -> Result<(), Error> {
        self.post("/api/templates/email/upsert", payload, "upsert template")
            .await
    }

    /// Sends a full record, HTML included, to the update endpoint.
    pub async fn update_template(&self, record: &TemplateRecord) -> Result<(), Error> {
        self.post("/api/templates/email/update", record, "update template")
            .await
    }

    pub async fn set_client_id(&self, template_id: u64, client_id: &str) -> Result<(), Error> {
        let body = ClientIdUpdate {
            template_id,
            client_template_id: client_id.to_string(),
        };

        self.post(
            "/api/templates/email/update",
            &body,
            &format!("update template {}", template_id),
        )
        .await
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        action: &str,
    ) -> Result<(), Error> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .authorized(self.http_client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to {}: {}", action, e))?;

        Self::check_status(response, action).await?;
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.api_key)
    }

    async fn check_status(response: Response, action: &str) -> Result<Response, Error> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(anyhow!("Failed to {}: {} - {}", action, status.as_u16(), error_text))
        }
    }
}
