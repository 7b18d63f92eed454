use std::{path::PathBuf, time::Duration};

use crate::utils::dir::DATA_FILE_NAME;

/// 25 minutes, one pomodoro.
pub const DEFAULT_REMINDER_DELAY: Duration = Duration::from_secs(25 * 60);

/// Everything outside of the data itself that changes tracker behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub data_file: PathBuf,
    pub reminder_delay: Duration,
}

impl TrackerConfig {
    pub fn in_dir(app_dir: PathBuf) -> Self {
        Self {
            data_file: app_dir.join(DATA_FILE_NAME),
            reminder_delay: DEFAULT_REMINDER_DELAY,
        }
    }

    pub fn with_data_file(self, data_file: Option<PathBuf>) -> Self {
        Self {
            data_file: data_file.unwrap_or(self.data_file),
            ..self
        }
    }

    pub fn with_reminder_delay(self, reminder_delay: Option<Duration>) -> Self {
        Self {
            reminder_delay: reminder_delay.unwrap_or(self.reminder_delay),
            ..self
        }
    }
}
