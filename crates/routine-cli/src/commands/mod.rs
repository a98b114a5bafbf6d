pub mod coach;
pub mod config;
pub mod event;
pub mod hydration;
pub mod mood;
pub mod plugin;
pub mod stats;
pub mod timeline;

use chrono::{Local, NaiveDate, NaiveTime};
use routine_core::ledger::CompletionStatus;
use routine_core::RoutineApp;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_app() -> Result<RoutineApp, Box<dyn std::error::Error>> {
    Ok(RoutineApp::open()?)
}

/// `--date` value, or today in local time.
pub fn day_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Parse "HH:MM" or "HH:MM:SS".
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{s}' (expected HH:MM)"))
}

pub fn status_marker(status: CompletionStatus) -> &'static str {
    match status {
        CompletionStatus::Pending => "[ ]",
        CompletionStatus::Completed => "[x]",
        CompletionStatus::Skipped => "[-]",
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
