mod datetime;
mod filesystem;
mod string;

pub use datetime::{FILENAME_TIMESTAMP_FORMAT, filename_timestamp, log_timestamp};
pub use filesystem::write_error_to_log;
pub use string::{contains_folded, fold_case, normalize_string, turkish_lowercase};
