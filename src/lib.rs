#![allow(clippy::needless_return)]

pub mod model;
pub mod utils;

pub use renewal_lib::ERRORS_LOG_FILE;
