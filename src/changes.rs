use anyhow::{Error, Result, anyhow};
use tracing::{debug, info, warn};

use crate::{
    clients::{
        github::GitHubClient,
        store::{LocalTemplateStore, template_name_from_file},
    },
    models::{
        change::{ChangeRecord, ChangeSet, ChangeSource},
        registry::FolderRegistry,
    },
};

/// Every template on disk under every registry folder that exists.
pub fn full_change_set(
    registry: &FolderRegistry,
    store: &LocalTemplateStore,
) -> Result<ChangeSet, Error> {
    let mut changes = ChangeSet::new();

    for folder in registry.folders() {
        if !store.folder_exists(folder) {
            debug!(folder, "Template folder not present, skipping");
            continue;
        }

        for name in store.list_candidates(folder)? {
            changes.insert(ChangeRecord::new(folder, name));
        }
    }

    Ok(changes)
}

/// Templates touched by `changed_files`. Paths outside every registry folder,
/// and files that are neither metadata nor HTML, are ignored.
pub fn filtered_change_set<S: AsRef<str>>(
    registry: &FolderRegistry,
    changed_files: &[S],
) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for path in changed_files {
        let path = path.as_ref();

        let Some(folder) = registry.folder_containing(path) else {
            debug!(path, "Changed file is outside template folders");
            continue;
        };

        let file_name = path.rsplit('/').next().unwrap_or(path);
        match template_name_from_file(file_name) {
            Some(name) => {
                changes.insert(ChangeRecord::new(folder, name));
            }
            None => debug!(path, "Changed file is not a template file"),
        }
    }

    changes
}

/// Builds the change set for a push from the requested source.
pub async fn resolve_changes(
    source: &ChangeSource,
    registry: &FolderRegistry,
    store: &LocalTemplateStore,
    github: Option<&GitHubClient>,
) -> Result<ChangeSet, Error> {
    let changed_files = match (source, github) {
        (ChangeSource::All, _) => return full_change_set(registry, store),
        (ChangeSource::PullRequest(number), Some(github)) => {
            github.pull_request_files(*number).await?
        }
        (ChangeSource::Commit(sha), Some(github)) => github.commit_files(sha).await?,
        (_, None) => {
            warn!(?source, "No GitHub client configured for filtered push");
            return Err(anyhow!("A GitHub client is required to resolve {:?}", source));
        }
    };

    info!(count = changed_files.len(), files = ?changed_files, "Changed files");

    Ok(filtered_change_set(registry, &changed_files))
}
