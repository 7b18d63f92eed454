//! Desktop notifications. Delivery is best-effort: callers log failures and carry on.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, error};

pub const REMINDER_TITLE: &str = "Reminder";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(&self, title: &str, message: &str) -> Result<()>;
}

/// Delivers notifications through `notify-send`.
pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn send(&self, title: &str, message: &str) -> Result<()> {
        let status = tokio::process::Command::new("notify-send")
            .arg(title)
            .arg(message)
            .status()
            .await?;
        if !status.success() {
            bail!("notify-send exited with {status}");
        }
        Ok(())
    }
}

pub fn break_message(project: &str, worked_for: Duration) -> String {
    format!(
        "You have been working on project '{project}' for {} minutes! Time to take a break.",
        worked_for.as_secs() / 60
    )
}

/// Sends the break reminder for `project`. Never fails.
pub async fn notify_break(notifier: &dyn Notifier, project: &str, worked_for: Duration) {
    debug!("Sending break reminder for {project}");
    if let Err(e) = notifier
        .send(REMINDER_TITLE, &break_message(project, worked_for))
        .await
    {
        error!("Failed to deliver reminder for {project}: {e:?}");
    }
}
