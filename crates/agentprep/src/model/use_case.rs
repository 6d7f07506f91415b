use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Draft,
    Analysis,
    Approved,
    InProgress,
    Completed,
    OnHold,
}

/// The top-level record describing one candidate process for automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub sponsor: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub owner_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UseCase {
    /// Creates an unsaved use case. The store assigns `id` and `created_at`.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            objective: String::new(),
            scope: String::new(),
            sponsor: String::new(),
            priority: Priority::default(),
            status: Status::default(),
            tags: BTreeSet::new(),
            owner_id: owner_id.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// True when the overview section (name, objective, scope) is filled in.
    pub fn overview_complete(&self) -> bool {
        [&self.name, &self.objective, &self.scope]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Most recent modification time, falling back to creation time.
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn matches(&self, filter: &UseCaseFilter) -> bool {
        if filter.status.is_some_and(|status| status != self.status) {
            return false;
        }
        if filter.priority.is_some_and(|priority| priority != self.priority) {
            return false;
        }
        if !filter.tags.is_empty() && !filter.tags.iter().any(|tag| self.tags.contains(tag)) {
            return false;
        }
        true
    }
}

/// Optional narrowing for use-case listings. Tags match if any overlap.
///
/// `offset` and `limit` page through the ordered matches.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UseCaseFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}
