use std::fmt::{Display, Formatter, Result};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum ItemOutcome {
    Synced,
    Skipped(String),
    Failed(String),
}

impl Display for ItemOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ItemOutcome::Synced => write!(f, "synced"),
            ItemOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            ItemOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub item: String,
    pub outcome: ItemOutcome,
}

/// Per-item results of one pull, push or client id run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub items: Vec<ItemReport>,
}

impl SyncReport {
    pub fn record(&mut self, item: impl Into<String>, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            item: item.into(),
            outcome,
        });
    }

    pub fn synced(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Synced))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed(_)))
    }

    pub fn outcome_of(&self, item: &str) -> Option<&ItemOutcome> {
        self.items
            .iter()
            .find(|report| report.item == item)
            .map(|report| &report.outcome)
    }

    fn count(&self, predicate: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|r| predicate(&r.outcome)).count()
    }
}
