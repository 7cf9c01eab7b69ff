//! Row structs and insert DTOs, one submodule per table.

pub mod import_run;
pub mod passenger;
pub mod user;
pub mod vehicle;
