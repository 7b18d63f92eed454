use std::{io::BufRead, sync::Arc};

use anyhow::Result;
use tokio::{select, sync::oneshot};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    indicator::display::{IndicatorDisplay, TerminalDisplay},
    store::project_store::ProjectStore,
    tracking::Tracker,
    utils::time::{entry_date, format_time_spent, whole_seconds},
};

use super::shutdown::detect_shutdown;

/// Reads one line on a plain thread. A pending tokio stdin read would keep the runtime alive
/// after Ctrl-C, a detached thread doesn't. `None` means stdin is closed.
fn spawn_line_reader() -> oneshot::Receiver<std::io::Result<Option<String>>> {
    let (sender, receiver) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let result = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map(|read| (read > 0).then(|| line.trim().to_string()));
        let _ = sender.send(result);
    });
    receiver
}

/// Waits until the user presses Enter or Ctrl-C. Returns the typed line, if any.
async fn wait_for_stop(cancellation: CancellationToken) -> Result<Option<String>> {
    select! {
        line = spawn_line_reader() => match line?? {
            Some(line) => Ok(Some(line)),
            None => {
                info!("Stdin is closed, waiting for Ctrl-C");
                cancellation.cancelled().await;
                Ok(None)
            }
        },
        _ = cancellation.cancelled() => Ok(None),
    }
}

/// A typed description wins over the one given on the command line.
fn pick_description(typed: Option<String>, given: Option<String>) -> String {
    typed
        .filter(|v| !v.is_empty())
        .or(given)
        .unwrap_or_default()
}

/// Tracks `project` in the foreground: starts it, keeps the indicator running and stops it once
/// the user is done. The indicator label goes on an empty line between the header and the input.
pub async fn track<S: ProjectStore + 'static>(
    tracker: &Tracker<S>,
    project: &str,
    description: Option<String>,
    terminal: Option<Arc<TerminalDisplay>>,
) -> Result<()> {
    let started = tracker.start_tracking(project).await?;
    println!(
        "Tracking {project} since {}. Type a description and press Enter to stop",
        entry_date(started)
    );
    println!();
    if let Some(terminal) = &terminal {
        terminal.show();
    }

    let cancellation = CancellationToken::new();
    tokio::spawn(detect_shutdown(cancellation.clone()));
    let typed = wait_for_stop(cancellation.clone()).await;
    cancellation.cancel();
    // The cursor has moved past the label line by now.
    if let Some(terminal) = &terminal {
        terminal.reset()?;
    }

    let elapsed = tracker
        .stop_tracking(project, &pick_description(typed?, description))
        .await?;
    println!(
        "Stopped {project} after {}",
        format_time_spent(whole_seconds(elapsed))
    );
    Ok(())
}
