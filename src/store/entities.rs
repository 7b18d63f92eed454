use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The whole persisted state: projects keyed by their unique name.
pub type ProjectCollection = BTreeMap<String, Project>;

/// Completed tracking session. Never modified after creation.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TimeEntry {
    pub time_spent: u64,
    pub description: String,
    pub date: String,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    /// Entries keyed by generated id. Order carries no meaning.
    #[serde(default)]
    pub entries: BTreeMap<String, TimeEntry>,
    #[serde(default)]
    pub is_active: bool,
}

impl Sprint {
    pub fn total_seconds(&self) -> u64 {
        self.entries.values().map(|v| v.time_spent).sum()
    }
}

/// A project is either idle (`start_time` is `None`) or tracking.
///
/// Everything apart from `entries` is optional on disk so that files written before sprints and
/// archival existed still load.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct Project {
    #[serde(default)]
    pub entries: Vec<TimeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sprints: BTreeMap<String, Sprint>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none::deserialize"
    )]
    pub active_sprint: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
}

impl Project {
    pub fn is_tracking(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn total_seconds(&self) -> u64 {
        self.entries.iter().map(|v| v.time_spent).sum()
    }

    /// The sprint `active_sprint` points at, if the reference is still valid.
    pub fn active_sprint(&self) -> Option<&Sprint> {
        self.active_sprint
            .as_ref()
            .and_then(|id| self.sprints.get(id))
    }
}

mod empty_as_none {
    use serde::{Deserialize, Deserializer};

    /// Older files store "no active sprint" as an empty string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|v| !v.is_empty()))
    }
}
