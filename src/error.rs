//! Error taxonomy of the tracker. Precondition failures are reported as [TrackerError] variants
//! and leave state untouched; storage failures are wrapped in [StoreError].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("project '{0}' already exists")]
    DuplicateName(String),

    #[error("sprint '{sprint}' already exists in project '{project}'")]
    DuplicateSprintName { project: String, sprint: String },

    #[error("project '{0}' does not exist")]
    ProjectNotFound(String),

    #[error("sprint '{sprint}' does not exist in project '{project}'")]
    SprintNotFound { project: String, sprint: String },

    #[error("tracking for project '{0}' is already running")]
    AlreadyTracking(String),

    #[error("tracking for project '{0}' is not running")]
    NotTracking(String),

    /// Archival is blocked while the project's timer is running.
    #[error("project '{0}' can't be archived while tracking is running")]
    ActiveTracking(String),

    #[error("project '{0}' is not archived")]
    NotArchived(String),

    /// Tracking can't start on an archived project.
    #[error("project '{0}' is archived")]
    ProjectArchived(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("data file {path:?} is corrupt: {source}")]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to access data file {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn persistence(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Persistence { path, source }
    }
}
