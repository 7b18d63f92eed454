use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument};

use crate::{
    notify::{notify_break, Notifier},
    tracking::engine::TrackedSession,
    utils::clock::Clock,
};

/// Answers whether a session captured earlier is still running.
#[async_trait]
pub trait SessionProbe: Send + Sync + 'static {
    async fn is_current(&self, session: &TrackedSession) -> bool;
}

/// Schedules one break reminder per started session.
///
/// Reminders are never cancelled. When one fires after its session was stopped or restarted it
/// is dropped, since the captured start time no longer matches.
pub struct Reminder {
    delay: Duration,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl Reminder {
    pub fn new(delay: Duration, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            delay,
            clock,
            notifier,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&self, session: TrackedSession, probe: impl SessionProbe) -> JoinHandle<()> {
        let clock = self.clock.clone();
        let notifier = self.notifier.clone();
        let delay = self.delay;
        let span = info_span!("reminder", project = %session.project);

        tokio::spawn(
            async move {
                clock.sleep(delay).await;
                if !probe.is_current(&session).await {
                    info!("Session is over, skipping reminder");
                    return;
                }
                notify_break(&*notifier, &session.project, delay).await;
            }
            .instrument(span),
        )
    }
}
