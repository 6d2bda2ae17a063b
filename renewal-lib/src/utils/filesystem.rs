use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::utils::log_timestamp;

/// Append an entry to the error log, creating the file on first use.
///
/// Each entry is a `[timestamp] error_type:` line followed by the message,
/// so several failed runs can be read back in order.
pub fn write_error_to_log(
    log_path: impl AsRef<Path>,
    error_type: &str,
    error_message: &str,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "\n[{}] {}:\n{}", log_timestamp(), error_type, error_message)
}
