//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod import_run_repo;
pub mod passenger_repo;
pub mod user_repo;
pub mod vehicle_repo;

pub use import_run_repo::ImportRunRepo;
pub use passenger_repo::PassengerRepo;
pub use user_repo::UserRepo;
pub use vehicle_repo::VehicleRepo;
