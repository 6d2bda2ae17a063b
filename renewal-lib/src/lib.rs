#![allow(clippy::needless_return)]

pub mod export;
pub mod ingest;
pub mod model;
pub mod stats;
pub mod store;
pub mod utils;

// Test utilities - only compiled when testing or with test feature
// #[cfg(test)] alone doesn't work for integration tests (they're external crates)
// The feature flag makes it available to integration tests via dev-dependencies
#[cfg(any(test, feature = "test"))]
pub mod test_utils;

pub use ingest::{IngestError, ingest, ingest_file};
pub use model::{Roster, Student, Teacher};
pub use store::{JsonFileStore, MemoryStore, RenewalStore, import_workbook};

pub const ERRORS_LOG_FILE: &str = "errors.log";
