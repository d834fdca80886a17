use std::path::PathBuf;

use anyhow::{Error, Result, anyhow};
use chrono::{DateTime, Utc};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::{
    registry::FolderRegistry,
    template::{ListQuery, TemplateType},
};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub iterable_api_key: String,
    #[serde(default = "default_iterable_base_url")]
    pub iterable_base_url: String,

    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    pub github_repo: Option<String>,
    pub github_token: Option<String>,
    pub pr_number: Option<u64>,
    pub commit_sha: Option<String>,

    #[serde(default = "default_template_root")]
    pub template_root: PathBuf,
    pub folder_registry_path: Option<PathBuf>,

    #[serde(default = "default_template_types")]
    pub template_types: Vec<TemplateType>,
    #[serde(default = "default_message_medium")]
    pub message_medium: String,
    pub template_start_date_time: Option<DateTime<Utc>>,
    pub template_end_date_time: Option<DateTime<Utc>>,

    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
}

/// Settings needed to ask GitHub which files a pull request or commit touched.
#[derive(Clone, Debug)]
pub struct GitHubConfig {
    pub api_url: String,
    pub repo: String,
    pub token: String,
}

fn default_iterable_base_url() -> String {
    "https://api.iterable.com".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_template_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_template_types() -> Vec<TemplateType> {
    vec![
        TemplateType::Base,
        TemplateType::Blast,
        TemplateType::Triggered,
        TemplateType::Workflow,
    ]
}

fn default_message_medium() -> String {
    "Email".to_string()
}

fn default_http_timeout_seconds() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    /// Builds a config with defaults for everything but the API key.
    pub fn with_api_key(iterable_api_key: impl Into<String>) -> Self {
        Self {
            iterable_api_key: iterable_api_key.into(),
            iterable_base_url: default_iterable_base_url(),
            github_api_url: default_github_api_url(),
            github_repo: None,
            github_token: None,
            pr_number: None,
            commit_sha: None,
            template_root: default_template_root(),
            folder_registry_path: None,
            template_types: default_template_types(),
            message_medium: default_message_medium(),
            template_start_date_time: None,
            template_end_date_time: None,
            http_timeout_seconds: default_http_timeout_seconds(),
        }
    }

    pub fn github_config(&self) -> Result<GitHubConfig, Error> {
        let repo = self
            .github_repo
            .clone()
            .ok_or_else(|| anyhow!("Missing environment variable: GITHUB_REPO"))?;
        let token = self
            .github_token
            .clone()
            .ok_or_else(|| anyhow!("Missing environment variable: GITHUB_TOKEN"))?;

        Ok(GitHubConfig {
            api_url: self.github_api_url.clone(),
            repo,
            token,
        })
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            template_types: self.template_types.clone(),
            message_medium: self.message_medium.clone(),
            start_date_time: self.template_start_date_time,
            end_date_time: self.template_end_date_time,
        }
    }

    pub fn folder_registry(&self) -> Result<FolderRegistry, Error> {
        match &self.folder_registry_path {
            Some(path) => FolderRegistry::from_json_file(path),
            None => Ok(FolderRegistry::default()),
        }
    }
}
