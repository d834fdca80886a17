use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};
use thiserror::Error;
use tracing::debug;

use crate::models::template::TemplateRecord;

const METADATA_SUFFIX: &str = "_metadata.json";
const HTML_SUFFIX: &str = ".html";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Missing metadata or HTML file for {name} in {folder}")]
    MissingPair { folder: String, name: String },

    #[error("I/O error on '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid metadata in '{path}': {reason}")]
    Json { path: PathBuf, reason: String },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A template as it sits on disk: metadata without the body, plus the body.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTemplate {
    pub metadata: TemplateRecord,
    pub html: String,
}

/// Reads and writes `<name>_metadata.json` / `<name>.html` pairs under a root.
#[derive(Debug, Clone)]
pub struct LocalTemplateStore {
    root: PathBuf,
}

/// Maps a display name onto a safe lowercase file stem.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    replaced.trim().to_ascii_lowercase().replace(' ', "_")
}

/// Recovers the template name from a metadata or HTML file name.
pub fn template_name_from_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(METADATA_SUFFIX)
        .or_else(|| file_name.strip_suffix(HTML_SUFFIX))
        .filter(|name| !name.is_empty())
}

impl LocalTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folder_exists(&self, folder: &str) -> bool {
        self.root.join(folder).is_dir()
    }

    pub fn metadata_path(&self, folder: &str, name: &str) -> PathBuf {
        self.root.join(folder).join(format!("{}{}", name, METADATA_SUFFIX))
    }

    pub fn html_path(&self, folder: &str, name: &str) -> PathBuf {
        self.root.join(folder).join(format!("{}{}", name, HTML_SUFFIX))
    }

    /// Writes the pair under the sanitized name and returns that name.
    /// Existing files with the same sanitized name are overwritten.
    pub fn write(
        &self,
        folder: &str,
        name: &str,
        metadata: &TemplateRecord,
        html: &str,
    ) -> Result<String, StoreError> {
        let dir = self.root.join(folder);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let sanitized = sanitize_name(name);
        let metadata_path = self.metadata_path(folder, &sanitized);
        let html_path = self.html_path(folder, &sanitized);

        let mut metadata = metadata.clone();
        metadata.remove("html");

        fs::write(&metadata_path, to_pretty_json(&Value::Object(metadata), &metadata_path)?)
            .map_err(|e| StoreError::io(&metadata_path, e))?;
        fs::write(&html_path, html).map_err(|e| StoreError::io(&html_path, e))?;

        debug!(folder, name = %sanitized, "Wrote template pair");

        Ok(sanitized)
    }

    pub fn read(&self, folder: &str, name: &str) -> Result<LocalTemplate, StoreError> {
        let metadata_path = self.metadata_path(folder, name);
        let html_path = self.html_path(folder, name);

        if !metadata_path.is_file() || !html_path.is_file() {
            return Err(StoreError::MissingPair {
                folder: folder.to_string(),
                name: name.to_string(),
            });
        }

        let raw = fs::read_to_string(&metadata_path)
            .map_err(|e| StoreError::io(&metadata_path, e))?;
        let metadata = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(metadata)) => metadata,
            Ok(_) => {
                return Err(StoreError::Json {
                    path: metadata_path,
                    reason: "expected a JSON object".to_string(),
                });
            }
            Err(e) => {
                return Err(StoreError::Json {
                    path: metadata_path,
                    reason: e.to_string(),
                });
            }
        };

        let html = fs::read_to_string(&html_path).map_err(|e| StoreError::io(&html_path, e))?;

        Ok(LocalTemplate { metadata, html })
    }

    /// Names of every template with a metadata file in `folder`, sorted.
    pub fn list_candidates(&self, folder: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(folder);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };

            if let Some(name) = file_name.strip_suffix(METADATA_SUFFIX) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

fn to_pretty_json(value: &Value, path: &Path) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));

    value.serialize(&mut serializer).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(buf)
}
