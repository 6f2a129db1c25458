//! Formatted output helpers for CLI commands.
//!
//! Provides result markers and human-readable durations.

use std::time::Duration;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Formats a duration for a result table (e.g., "350ms", "12.4s", "2m 03s").
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else if duration.as_secs() < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// Returns a colored PASS/FAIL marker.
#[must_use]
pub fn result_marker(passed: bool) -> String {
    if passed {
        format!("{GREEN}{BOLD}PASS{RESET}")
    } else {
        format!("{RED}{BOLD}FAIL{RESET}")
    }
}

/// Formats an optional value, using "-" when absent.
#[must_use]
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
