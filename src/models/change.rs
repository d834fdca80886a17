use std::collections::BTreeSet;

/// A template selected for a push: the folder it lives in and its local name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChangeRecord {
    pub folder: String,
    pub name: String,
}

impl ChangeRecord {
    pub fn new(folder: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }
}

pub type ChangeSet = BTreeSet<ChangeRecord>;

/// Where a push gets its list of templates from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSource {
    All,
    PullRequest(u64),
    Commit(String),
}
