pub mod imports;
pub mod passengers;
