use std::{
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use ansi_term::Colour;
use anyhow::Result;
#[cfg(test)]
use mockall::automock;

/// Surface the elapsed-time label is rendered on. A tray title, a status line, etc.
#[cfg_attr(test, automock)]
pub trait IndicatorDisplay: Send + Sync + 'static {
    fn set_label(&self, label: &str) -> Result<()>;

    /// Returns the surface to its idle look.
    fn reset(&self) -> Result<()>;
}

/// Keeps the label on the terminal line directly above the cursor, leaving the cursor's own line
/// to whatever the user is typing.
///
/// Nothing is drawn until [TerminalDisplay::show] is called, so the caller can first print its
/// own output and leave an empty line for the label. Drawing goes to stderr so stdout stays
/// clean.
#[derive(Default)]
pub struct TerminalDisplay {
    shown: AtomicBool,
}

/// Save cursor, move one line up, clear that line.
const ENTER_LABEL_LINE: &str = "\x1b7\x1b[1A\r\x1b[2K";
/// Restore cursor.
const LEAVE_LABEL_LINE: &str = "\x1b8";

impl TerminalDisplay {
    pub fn show(&self) {
        self.shown.store(true, Ordering::SeqCst);
    }

    fn label_sequence(label: &str) -> String {
        format!(
            "{ENTER_LABEL_LINE}{}{LEAVE_LABEL_LINE}",
            Colour::Green.bold().paint(label)
        )
    }
}

impl IndicatorDisplay for TerminalDisplay {
    fn set_label(&self, label: &str) -> Result<()> {
        if !self.shown.load(Ordering::SeqCst) {
            return Ok(());
        }
        let mut stderr = std::io::stderr().lock();
        write!(stderr, "{}", Self::label_sequence(label))?;
        stderr.flush()?;
        Ok(())
    }

    /// Stops drawing. The last label stays where it is, since by now the line above the cursor
    /// may hold the user's input.
    fn reset(&self) -> Result<()> {
        self.shown.store(false, Ordering::SeqCst);
        Ok(())
    }
}
