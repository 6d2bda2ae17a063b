use chrono::{Local, SecondsFormat, Utc};

/// Local time layout used in generated file names, free of `:` so it is valid everywhere
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// UTC time of a log entry, RFC 3339 with second precision
pub fn log_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn filename_timestamp() -> String {
    Local::now().format(FILENAME_TIMESTAMP_FORMAT).to_string()
}
