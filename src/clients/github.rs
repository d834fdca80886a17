use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::GitHubConfig;

const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct ChangedFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

/// Lists the files touched by a pull request or a single commit.
pub struct GitHubClient {
    http_client: Client,
    api_url: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig, timeout_seconds: u64) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("template-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(repo = %config.repo, "GitHub client initialized");

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    pub async fn pull_request_files(&self, pr_number: u64) -> Result<Vec<String>, Error> {
        let url = format!("{}/repos/{}/pulls/{}/files", self.api_url, self.repo, pr_number);
        let mut filenames = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .authorized(self.http_client.get(&url))
                .query(&[("per_page", PAGE_SIZE), ("page", page)])
                .send()
                .await
                .map_err(|e| anyhow!("Failed to get changed files: {}", e))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(anyhow!(
                    "Failed to get changed files: {} - {}",
                    status.as_u16(),
                    error_text
                ));
            }

            let files: Vec<ChangedFile> = response
                .json()
                .await
                .map_err(|e| anyhow!("Failed to parse changed files JSON: {}", e))?;

            debug!(pr_number, page, count = files.len(), "Fetched pull request files");

            let last_page = files.len() < PAGE_SIZE;
            filenames.extend(files.into_iter().map(|f| f.filename));

            if last_page {
                break;
            }
            page += 1;
        }

        Ok(filenames)
    }

    pub async fn commit_files(&self, sha: &str) -> Result<Vec<String>, Error> {
        let url = format!("{}/repos/{}/commits/{}", self.api_url, self.repo, sha);

        let response = self
            .authorized(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to get commit files: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Failed to get commit files: {} - {}",
                status.as_u16(),
                error_text
            ));
        }

        let commit: CommitResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse commit JSON: {}", e))?;

        debug!(sha, count = commit.files.len(), "Fetched commit files");

        Ok(commit.files.into_iter().map(|f| f.filename).collect())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
    }
}
