use fleetops_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: DbId,
    pub plate_number: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub capacity: i32,
    pub fuel_type: String,
    pub status: String,
    pub last_maintenance: Option<Timestamp>,
    pub next_maintenance: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateVehicle {
    pub plate_number: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub capacity: i32,
    pub fuel_type: String,
    pub status: String,
    pub last_maintenance: Option<Timestamp>,
    pub next_maintenance: Option<Timestamp>,
}
