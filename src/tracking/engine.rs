//! The per-project timer state machine.
//!
//! ```text
//! Idle (start_time = None) --start--> Tracking (start_time = Some(t))
//! Tracking                 --stop---> Idle, one TimeEntry recorded
//! ```
//!
//! Anything else is rejected with an error instead of being ignored.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::TrackerError,
    store::entities::{ProjectCollection, TimeEntry},
    utils::time::{entry_date, whole_seconds},
};

use super::registry::project_mut;

/// A running session as seen from the outside: which project and since when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSession {
    pub project: Arc<str>,
    pub started_at: DateTime<Utc>,
}

impl TrackedSession {
    pub fn new(project: impl Into<Arc<str>>, started_at: DateTime<Utc>) -> Self {
        Self {
            project: project.into(),
            started_at,
        }
    }
}

/// Result of a stop transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedSession {
    pub elapsed: Duration,
    pub entry: TimeEntry,
}

pub fn start(
    projects: &mut ProjectCollection,
    name: &str,
    now: DateTime<Utc>,
) -> Result<TrackedSession, TrackerError> {
    let project = project_mut(projects, name)?;

    if project.is_tracking() {
        warn!("Tracking for {name} is already running");
        return Err(TrackerError::AlreadyTracking(name.to_string()));
    }
    if project.archived {
        return Err(TrackerError::ProjectArchived(name.to_string()));
    }

    if project.active_sprint.is_some() && project.active_sprint().is_none() {
        debug!("Clearing stale active sprint {:?} of {name}", project.active_sprint);
        project.active_sprint = None;
    }

    project.start_time = Some(now);
    Ok(TrackedSession::new(name, now))
}

pub fn stop(
    projects: &mut ProjectCollection,
    name: &str,
    description: &str,
    now: DateTime<Utc>,
) -> Result<StoppedSession, TrackerError> {
    let Some((project, started_at)) = projects
        .get_mut(name)
        .and_then(|project| project.start_time.map(|started_at| (project, started_at)))
    else {
        warn!("Tracking for {name} is not running");
        return Err(TrackerError::NotTracking(name.to_string()));
    };

    let elapsed = now - started_at;
    let entry = TimeEntry {
        time_spent: whole_seconds(elapsed),
        description: description.to_string(),
        date: entry_date(now),
    };

    if let Some(sprint) = project
        .active_sprint
        .clone()
        .and_then(|id| project.sprints.get_mut(&id))
    {
        sprint
            .entries
            .insert(Uuid::new_v4().to_string(), entry.clone());
    }

    // The project-level list is never filtered by sprint.
    project.entries.push(entry.clone());
    project.start_time = None;

    Ok(StoppedSession { elapsed, entry })
}

/// All running sessions, most recently started last.
pub fn running_sessions(projects: &ProjectCollection) -> Vec<TrackedSession> {
    let mut sessions = projects
        .iter()
        .filter_map(|(name, project)| {
            project
                .start_time
                .map(|started_at| TrackedSession::new(name.as_str(), started_at))
        })
        .collect::<Vec<_>>();
    sessions.sort_by_key(|v| v.started_at);
    sessions
}
