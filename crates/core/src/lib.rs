//! Fleet operations domain core.
//!
//! Pure types and logic shared by the pipeline, database and API crates.
//! Nothing in here performs I/O or depends on an async runtime.

pub mod bulk_import;
pub mod error;
pub mod import_status;
pub mod passenger;
pub mod paging;
pub mod types;
