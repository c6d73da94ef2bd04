//! Artifact timestamps (`YYYYMMDD-HHMMSS`, local time, second resolution)

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// strftime pattern used in artifact file names
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Format a point in time as an artifact stamp
pub fn format_stamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(STAMP_FORMAT).to_string()
}

/// Stamp for the current local time
pub fn now_stamp() -> String {
    format_stamp(&Local::now())
}
