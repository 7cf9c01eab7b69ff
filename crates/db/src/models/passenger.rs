use fleetops_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `passengers` table. `id` is the owning user's id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Passenger {
    pub id: DbId,
    pub department: String,
    pub employee_id: String,
    pub home_address: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreatePassenger {
    pub user_id: DbId,
    pub department: String,
    pub employee_id: String,
    pub home_address: String,
}
