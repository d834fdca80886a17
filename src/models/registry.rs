use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Error, Result, anyhow};

/// Folder used for templates whose category id has no mapping.
pub const UNKNOWN_FOLDER: &str = "unknown";

const DEFAULT_FOLDERS: [(&str, &str); 5] = [
    ("64268", "src/templates/email/marketing/cartReminders_64268"),
    ("64265", "src/templates/email/marketing/dailyPrommotional_64265"),
    ("64269", "src/templates/email/marketing/productSuggestions_64269"),
    ("64267", "src/templates/email/marketing/weeklyNewsletter_64267"),
    ("64266", "src/templates/email/marketing/weeklyPromotional_64266"),
];

/// Read-only mapping from a message type id to the folder its templates live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRegistry {
    folders: BTreeMap<String, String>,
}

impl Default for FolderRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_FOLDERS
                .iter()
                .map(|(id, folder)| (id.to_string(), folder.to_string())),
        )
    }
}

impl FolderRegistry {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            folders: entries.into_iter().collect(),
        }
    }

    /// Loads a `{ "<message type id>": "<folder>" }` JSON object.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read folder registry {}: {}", path.display(), e))?;
        let folders: BTreeMap<String, String> = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("Invalid folder registry {}: {}", path.display(), e))?;

        Ok(Self { folders })
    }

    pub fn folder_for(&self, category_id: &str) -> &str {
        self.folders
            .get(category_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_FOLDER)
    }

    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.values().map(String::as_str)
    }

    /// Returns the registry folder that directly contains `path`.
    pub fn folder_containing(&self, path: &str) -> Option<&str> {
        let parent = Path::new(path).parent()?;
        self.folders()
            .find(|folder| parent == Path::new(folder))
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
