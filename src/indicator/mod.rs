//! Live elapsed-time label for the tracked project, and the one-shot break reminder.
//!
//! [Indicator] is either armed (one refresh task running) or disarmed. The session it renders is
//! kept under the same lock as the armed state, so a refresh never sees a project name from one
//! session and a start time from another.

pub mod display;
pub mod reminder;

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, Instrument};

use crate::{
    tracking::engine::TrackedSession,
    utils::{
        clock::Clock,
        time::{format_time_spent, whole_seconds},
    },
};

use display::IndicatorDisplay;

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Default)]
struct IndicatorState {
    session: Option<TrackedSession>,
    ticker: Option<CancellationToken>,
}

pub struct Indicator {
    display: Arc<dyn IndicatorDisplay>,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<IndicatorState>>,
}

fn lock(state: &Mutex<IndicatorState>) -> MutexGuard<'_, IndicatorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn render_label(session: &TrackedSession, clock: &dyn Clock) -> String {
    let elapsed = whole_seconds(clock.time() - session.started_at);
    format!("{}: {}", session.project, format_time_spent(elapsed))
}

impl Indicator {
    pub fn new(display: Arc<dyn IndicatorDisplay>, clock: Arc<dyn Clock>) -> Self {
        Self {
            display,
            clock,
            state: Arc::new(Mutex::new(IndicatorState::default())),
        }
    }

    /// Shows `session`. Starts the refresh task unless one is already running.
    pub fn arm(&self, session: TrackedSession) {
        let mut state = lock(&self.state);
        state.session = Some(session);
        if state.ticker.is_some() {
            debug!("Indicator already armed, switched session");
            return;
        }

        let token = CancellationToken::new();
        tokio::spawn(
            refresh_loop(
                self.display.clone(),
                self.clock.clone(),
                self.state.clone(),
                token.clone(),
            )
            .instrument(info_span!("indicator")),
        );
        state.ticker = Some(token);
    }

    /// Stops the refresh task and resets the display. Does nothing when not armed.
    pub fn disarm(&self) {
        let mut state = lock(&self.state);
        let Some(token) = state.ticker.take() else {
            return;
        };
        token.cancel();
        state.session = None;
        if let Err(e) = self.display.reset() {
            error!("Failed to reset indicator {e:?}");
        }
    }

    pub fn is_armed(&self) -> bool {
        lock(&self.state).ticker.is_some()
    }

    pub fn session(&self) -> Option<TrackedSession> {
        lock(&self.state).session.clone()
    }
}

impl Drop for Indicator {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.state).ticker.take() {
            token.cancel();
        }
    }
}

async fn refresh_loop(
    display: Arc<dyn IndicatorDisplay>,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<IndicatorState>>,
    shutdown: CancellationToken,
) {
    let mut refresh_point = clock.instant();
    loop {
        {
            // Rendering under the lock keeps a late tick from overwriting a reset.
            let state = lock(&state);
            if shutdown.is_cancelled() {
                return;
            }
            if let Some(session) = &state.session {
                if let Err(e) = display.set_label(&render_label(session, &*clock)) {
                    error!("Failed to render indicator {e:?}");
                }
            }
        }

        refresh_point += REFRESH_INTERVAL;
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = clock.sleep_until(refresh_point) => ()
        }
    }
}
