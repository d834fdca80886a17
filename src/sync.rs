use anyhow::{Error, Result};
use tracing::{info, warn};

use crate::{
    changes::resolve_changes,
    clients::{
        github::GitHubClient,
        iterable::IterableClient,
        store::{LocalTemplateStore, StoreError},
    },
    config::Config,
    models::{
        change::{ChangeSet, ChangeSource},
        registry::FolderRegistry,
        status::{ItemOutcome, SyncReport},
        template::{ListQuery, TemplateSummary, UpsertPayload, split_html, with_html},
    },
};

/// How local templates are sent to Iterable during a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMethod {
    /// Upsert by client template id with the fixed field set.
    #[default]
    Upsert,
    /// Send the local metadata as-is, with the HTML injected.
    Update,
}

pub struct TemplateSync {
    iterable: IterableClient,
    github: Option<GitHubClient>,
    store: LocalTemplateStore,
    registry: FolderRegistry,
    list_query: ListQuery,
}

impl TemplateSync {
    pub fn new(config: Config) -> Result<Self, Error> {
        let iterable = IterableClient::new(&config)?;
        let github = match config.github_config() {
            Ok(github_config) => Some(GitHubClient::new(
                &github_config,
                config.http_timeout_seconds,
            )?),
            Err(_) => None,
        };

        Ok(Self {
            iterable,
            github,
            store: LocalTemplateStore::new(config.template_root.clone()),
            registry: config.folder_registry()?,
            list_query: config.list_query(),
        })
    }

    pub fn store(&self) -> &LocalTemplateStore {
        &self.store
    }

    pub fn registry(&self) -> &FolderRegistry {
        &self.registry
    }

    /// Fetches every listed template and writes it to its category folder.
    pub async fn pull(&self) -> SyncReport {
        let mut report = SyncReport::default();

        for summary in self.list_all(&mut report).await {
            let item = format!("template {}", summary.template_id);
            let outcome = self.pull_one(&summary).await;

            if let ItemOutcome::Failed(reason) = &outcome {
                warn!(template_id = summary.template_id, error = %reason, "Failed to pull template");
            }
            report.record(item, outcome);
        }

        log_summary("pull", &report);
        report
    }

    async fn pull_one(&self, summary: &TemplateSummary) -> ItemOutcome {
        info!(template_id = summary.template_id, "Fetching template");

        let record = match self.iterable.get_template(summary.template_id).await {
            Ok(record) => record,
            Err(e) => return ItemOutcome::Failed(e.to_string()),
        };

        let folder = self
            .registry
            .folder_for(summary.message_type_id.as_deref().unwrap_or_default());
        let (metadata, html) = split_html(record);

        match self.store.write(folder, &summary.name, &metadata, &html) {
            Ok(name) => {
                info!(template_id = summary.template_id, folder, name = %name, "Template saved");
                ItemOutcome::Synced
            }
            Err(e) => ItemOutcome::Failed(e.to_string()),
        }
    }

    pub async fn resolve_changes(&self, source: &ChangeSource) -> Result<ChangeSet, Error> {
        resolve_changes(source, &self.registry, &self.store, self.github.as_ref()).await
    }

    /// Sends each changed template to Iterable. Failures are recorded and the
    /// remaining templates are still attempted.
    pub async fn push(&self, changes: &ChangeSet, method: PushMethod) -> SyncReport {
        let mut report = SyncReport::default();

        if changes.is_empty() {
            info!("No templates to update.");
            return report;
        }

        for change in changes {
            let item = format!("{}/{}", change.folder, change.name);
            info!(folder = %change.folder, name = %change.name, "Processing template");

            let template = match self.store.read(&change.folder, &change.name) {
                Ok(template) => template,
                Err(e @ StoreError::MissingPair { .. }) => {
                    warn!(folder = %change.folder, name = %change.name, "Missing metadata or HTML file");
                    report.record(item, ItemOutcome::Skipped(e.to_string()));
                    continue;
                }
                Err(e) => {
                    warn!(folder = %change.folder, name = %change.name, error = %e, "Failed to read template");
                    report.record(item, ItemOutcome::Failed(e.to_string()));
                    continue;
                }
            };

            let result = match method {
                PushMethod::Upsert => {
                    let payload = UpsertPayload::from_local(&template.metadata, &template.html);
                    self.iterable.upsert_template(&payload).await
                }
                PushMethod::Update => {
                    let record = with_html(&template.metadata, &template.html);
                    self.iterable.update_template(&record).await
                }
            };

            match result {
                Ok(()) => {
                    info!(name = %change.name, "Successfully pushed template");
                    report.record(item, ItemOutcome::Synced);
                }
                Err(e) => {
                    warn!(name = %change.name, error = %e, "Failed to push template");
                    report.record(item, ItemOutcome::Failed(e.to_string()));
                }
            }
        }

        log_summary("push", &report);
        report
    }

    /// Sets each remote template's client template id to its display name.
    pub async fn assign_client_ids(&self) -> SyncReport {
        let mut report = SyncReport::default();

        for summary in self.list_all(&mut report).await {
            let item = format!("template {}", summary.template_id);

            match self
                .iterable
                .set_client_id(summary.template_id, &summary.name)
                .await
            {
                Ok(()) => {
                    info!(
                        template_id = summary.template_id,
                        client_template_id = %summary.name,
                        "Successfully updated clientTemplateId"
                    );
                    report.record(item, ItemOutcome::Synced);
                }
                Err(e) => {
                    warn!(template_id = summary.template_id, error = %e, "Failed to update template");
                    report.record(item, ItemOutcome::Failed(e.to_string()));
                }
            }
        }

        log_summary("assign-client-ids", &report);
        report
    }

    /// Lists every configured template type. A type whose listing fails is
    /// recorded as failed and contributes no templates.
    async fn list_all(&self, report: &mut SyncReport) -> Vec<TemplateSummary> {
        let mut templates = Vec::new();

        for template_type in &self.list_query.template_types {
            match self
                .iterable
                .list_templates(&self.list_query, *template_type)
                .await
            {
                Ok(found) => {
                    info!(%template_type, count = found.len(), "Found templates");
                    templates.extend(found);
                }
                Err(e) => {
                    warn!(%template_type, error = %e, "Failed to list templates");
                    report.record(
                        format!("list {}", template_type),
                        ItemOutcome::Failed(e.to_string()),
                    );
                }
            }
        }

        templates
    }
}

fn log_summary(operation: &str, report: &SyncReport) {
    info!(
        operation,
        synced = report.synced(),
        skipped = report.skipped(),
        failed = report.failed(),
        "Run finished"
    );
}
