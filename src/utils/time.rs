use chrono::{DateTime, Duration, Local, Utc};

/// Format used for [TimeEntry](crate::store::entities::TimeEntry) dates.
pub const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for sprint start dates.
pub const SPRINT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Entry dates are written in local time, the way the user reads them.
pub fn entry_date(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format(ENTRY_DATE_FORMAT).to_string()
}

pub fn sprint_date(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format(SPRINT_DATE_FORMAT).to_string()
}

/// Truncates a duration to whole seconds. Negative durations (clock moved backwards) become 0.
pub fn whole_seconds(duration: Duration) -> u64 {
    duration.num_seconds().max(0) as u64
}

/// Renders seconds as `Xh Ym Zs`, omitting leading zero units.
pub fn format_time_spent(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut result = String::new();
    if hours > 0 {
        result.push_str(&format!("{hours}h "));
    }
    if minutes > 0 || hours > 0 {
        result.push_str(&format!("{minutes}m "));
    }
    result.push_str(&format!("{secs}s"));
    result
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{format_time_spent, whole_seconds};

    #[test]
    fn test_format_time_spent() {
        assert_eq!(format_time_spent(0), "0s");
        assert_eq!(format_time_spent(59), "59s");
        assert_eq!(format_time_spent(60), "1m 0s");
        assert_eq!(format_time_spent(3600), "1h 0m 0s");
        assert_eq!(format_time_spent(3723), "1h 2m 3s");
    }

    #[test]
    fn test_whole_seconds_truncates() {
        assert_eq!(whole_seconds(Duration::milliseconds(5900)), 5);
        assert_eq!(whole_seconds(Duration::milliseconds(999)), 0);
        assert_eq!(whole_seconds(Duration::seconds(-3)), 0);
    }
}
