//! [Tracker] owns the in-memory [ProjectCollection] of one process. Every mutation takes the
//! collection lock and the store lock, reloads the collection from the store, applies a
//! [registry] or [engine] rule and persists the whole collection before either lock is released.
//! Mutations never interleave, whether they come from tasks of this process or from another
//! process working on the same data file.

pub mod engine;
pub mod registry;
pub mod summary;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
    error::TrackerError,
    indicator::{
        display::IndicatorDisplay,
        reminder::{Reminder, SessionProbe},
        Indicator,
    },
    notify::{notify_break, Notifier},
    store::{
        entities::{ProjectCollection, Sprint},
        project_store::ProjectStore,
    },
    utils::{clock::Clock, time::sprint_date},
};

use engine::TrackedSession;
use summary::ProjectSummary;

struct Shared<S> {
    store: S,
    projects: Mutex<ProjectCollection>,
    /// Set while memory holds changes the store rejected. Those win over the stored state.
    unsaved: AtomicBool,
}

impl<S: ProjectStore> Shared<S> {
    async fn refresh(&self, projects: &mut ProjectCollection) -> Result<(), TrackerError> {
        if self.unsaved.load(Ordering::SeqCst) {
            debug!("Keeping unsaved changes over the stored collection");
            return Ok(());
        }
        *projects = self.store.load().await?;
        Ok(())
    }

    async fn persist(
        &self,
        lock: &S::Guard,
        projects: &ProjectCollection,
    ) -> Result<(), TrackerError> {
        let result = self.store.save(lock, projects).await;
        self.unsaved.store(result.is_err(), Ordering::SeqCst);
        Ok(result?)
    }
}

/// Checks reminders against the latest stored state, so a session stopped by another process
/// counts as over.
struct StoredSessions<S>(Arc<Shared<S>>);

#[async_trait]
impl<S: ProjectStore + 'static> SessionProbe for StoredSessions<S> {
    async fn is_current(&self, session: &TrackedSession) -> bool {
        let mut projects = self.0.projects.lock().await;
        if let Err(e) = self.0.refresh(&mut projects).await {
            warn!("Couldn't reload projects, using the last known state {e:?}");
        }
        projects
            .get(&*session.project)
            .and_then(|v| v.start_time)
            == Some(session.started_at)
    }
}

pub struct Tracker<S> {
    shared: Arc<Shared<S>>,
    clock: Arc<dyn Clock>,
    indicator: Option<Indicator>,
    reminder: Reminder,
    notifier: Arc<dyn Notifier>,
}

impl<S: ProjectStore + 'static> Tracker<S> {
    /// Loads the collection from `store`.
    ///
    /// Without a `display` the tracker has no indicator at all. With one, a session left running
    /// by a previous run is shown right away.
    pub async fn open(
        store: S,
        reminder_delay: Duration,
        clock: Arc<dyn Clock>,
        display: Option<Arc<dyn IndicatorDisplay>>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, TrackerError> {
        let projects = store.load().await?;
        info!("Loaded {} projects", projects.len());

        let tracker = Self {
            shared: Arc::new(Shared {
                store,
                projects: Mutex::new(projects),
                unsaved: AtomicBool::new(false),
            }),
            indicator: display.map(|display| Indicator::new(display, clock.clone())),
            reminder: Reminder::new(reminder_delay, clock.clone(), notifier.clone()),
            clock,
            notifier,
        };
        tracker.follow_running(&*tracker.shared.projects.lock().await);
        Ok(tracker)
    }

    /// Points the indicator at the most recently started session, or disarms it when nothing
    /// runs.
    fn follow_running(&self, projects: &ProjectCollection) {
        let Some(indicator) = &self.indicator else {
            return;
        };
        match engine::running_sessions(projects).pop() {
            Some(session) => {
                debug!("Indicator follows {}", session.project);
                indicator.arm(session);
            }
            None => indicator.disarm(),
        }
    }

    /// Takes both locks and brings memory up to date with the store.
    async fn begin(
        &self,
    ) -> Result<(MutexGuard<'_, ProjectCollection>, S::Guard), TrackerError> {
        let mut projects = self.shared.projects.lock().await;
        let lock = self.shared.store.lock().await?;
        self.shared.refresh(&mut projects).await?;
        Ok((projects, lock))
    }

    /// Runs `operation` on the freshly loaded collection and persists the result when it
    /// succeeds.
    async fn mutate<T>(
        &self,
        operation: impl FnOnce(&mut ProjectCollection) -> Result<T, TrackerError>,
    ) -> Result<T, TrackerError> {
        let (mut projects, lock) = self.begin().await?;
        let value = operation(&mut *projects);
        self.follow_running(&projects);
        let value = value?;
        self.shared.persist(&lock, &projects).await?;
        Ok(value)
    }

    pub async fn create_project(&self, name: &str) -> Result<(), TrackerError> {
        self.mutate(|projects| registry::create_project(projects, name))
            .await?;
        info!("Created project {name}");
        Ok(())
    }

    /// Returns the id of the new sprint, which becomes the project's only active sprint.
    pub async fn create_sprint(
        &self,
        project: &str,
        sprint: &str,
        description: &str,
    ) -> Result<String, TrackerError> {
        let start_date = sprint_date(self.clock.time());
        let id = self
            .mutate(|projects| {
                registry::create_sprint(projects, project, sprint, description, start_date)
            })
            .await?;
        info!("Created sprint {sprint} ({id}) in {project}");
        Ok(id)
    }

    pub async fn set_active_sprint(&self, project: &str, sprint_id: &str) -> Result<(), TrackerError> {
        self.mutate(|projects| registry::set_active_sprint(projects, project, sprint_id))
            .await?;
        info!("Activated sprint {sprint_id} in {project}");
        Ok(())
    }

    /// Activates a sprint given either its id or its name.
    pub async fn select_sprint(&self, project: &str, id_or_name: &str) -> Result<Sprint, TrackerError> {
        let sprint = self
            .mutate(|projects| {
                let sprint = registry::find_sprint(projects, project, id_or_name)?;
                registry::set_active_sprint(projects, project, &sprint.id)?;
                Ok(sprint)
            })
            .await?;
        info!("Activated sprint {} in {project}", sprint.name);
        Ok(sprint)
    }

    pub async fn archive_project(&self, name: &str) -> Result<(), TrackerError> {
        self.mutate(|projects| registry::archive_project(projects, name))
            .await?;
        info!("Archived project {name}");
        Ok(())
    }

    pub async fn restore_project(&self, name: &str) -> Result<(), TrackerError> {
        self.mutate(|projects| registry::restore_project(projects, name))
            .await?;
        info!("Restored project {name}");
        Ok(())
    }

    pub async fn list_project_names(&self, include_archived: bool) -> Vec<String> {
        registry::list_project_names(&*self.shared.projects.lock().await, include_archived)
    }

    pub async fn list_sprints(&self, project: &str) -> Result<Vec<Sprint>, TrackerError> {
        registry::list_sprints(&*self.shared.projects.lock().await, project)
    }

    /// Starts the timer of `name`, arms the indicator and schedules the break reminder.
    /// Returns the start time.
    pub async fn start_tracking(&self, name: &str) -> Result<DateTime<Utc>, TrackerError> {
        let (mut projects, lock) = self.begin().await?;
        let started = engine::start(&mut projects, name, self.clock.time());
        self.follow_running(&projects);
        let session = started?;
        info!("Started tracking {name}");

        // Side effects follow the in-memory state, even if the save below fails.
        if let Some(indicator) = &self.indicator {
            indicator.arm(session.clone());
        }
        self.reminder
            .schedule(session.clone(), StoredSessions(self.shared.clone()));

        self.shared.persist(&lock, &projects).await?;
        Ok(session.started_at)
    }

    /// Stops the timer of `name`, records the entry and returns the exact elapsed time.
    pub async fn stop_tracking(
        &self,
        name: &str,
        description: &str,
    ) -> Result<chrono::Duration, TrackerError> {
        let stopped = self
            .mutate(|projects| engine::stop(projects, name, description, self.clock.time()))
            .await?;
        info!(
            "Stopped tracking {name} after {}s",
            stopped.entry.time_spent
        );
        Ok(stopped.elapsed)
    }

    /// Sends the break reminder for `project` right away. Failures are only logged.
    pub async fn notify(&self, project: &str) {
        notify_break(&*self.notifier, project, self.reminder.delay()).await;
    }

    /// Running sessions, most recently started last.
    pub async fn tracking_sessions(&self) -> Vec<TrackedSession> {
        engine::running_sessions(&*self.shared.projects.lock().await)
    }

    pub async fn summary(&self) -> Vec<ProjectSummary> {
        summary::summarize(&*self.shared.projects.lock().await)
    }

    pub async fn snapshot(&self) -> ProjectCollection {
        self.shared.projects.lock().await.clone()
    }

    /// `None` for a tracker opened without a display.
    pub fn indicator(&self) -> Option<&Indicator> {
        self.indicator.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Stops the indicator and writes the collection out. Called on every exit path.
    pub async fn shutdown(&self) -> Result<(), TrackerError> {
        debug!("Shutting down tracker");
        if let Some(indicator) = &self.indicator {
            indicator.disarm();
        }
        let (projects, lock) = self.begin().await?;
        self.shared.persist(&lock, &projects).await?;
        Ok(())
    }
}
