use chrono::{DateTime, Utc};

use crate::store::entities::{ProjectCollection, TimeEntry};

use super::registry::sorted_sprints;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintSummary {
    pub name: String,
    pub is_active: bool,
    pub total_seconds: u64,
}

/// Totals for one project. Sprint totals count only entries recorded while the sprint was
/// active; the project total counts everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub archived: bool,
    pub tracking_since: Option<DateTime<Utc>>,
    pub total_seconds: u64,
    pub sprints: Vec<SprintSummary>,
    pub entries: Vec<TimeEntry>,
}

pub fn summarize(projects: &ProjectCollection) -> Vec<ProjectSummary> {
    projects
        .iter()
        .map(|(name, project)| ProjectSummary {
            name: name.clone(),
            archived: project.archived,
            tracking_since: project.start_time,
            total_seconds: project.total_seconds(),
            sprints: sorted_sprints(project)
                .into_iter()
                .map(|sprint| SprintSummary {
                    name: sprint.name.clone(),
                    is_active: sprint.is_active,
                    total_seconds: sprint.total_seconds(),
                })
                .collect(),
            entries: project.entries.clone(),
        })
        .collect()
}
