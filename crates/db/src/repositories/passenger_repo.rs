//! Repository for the `passengers` table.

use fleetops_core::types::DbId;
use sqlx::PgPool;

use crate::models::passenger::{CreatePassenger, Passenger};

const COLUMNS: &str = "id, department, employee_id, home_address, created_at, updated_at";

pub struct PassengerRepo;

impl PassengerRepo {
    /// Insert the profile for an existing user.
    ///
    /// Fails with a foreign key violation if the user does not exist and a
    /// unique violation on `uq_passengers_employee_id` for a reused
    /// employee id.
    pub async fn create(pool: &PgPool, input: &CreatePassenger) -> Result<Passenger, sqlx::Error> {
        let query = format!(
            "INSERT INTO passengers (id, department, employee_id, home_address)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Passenger>(&query)
            .bind(input.user_id)
            .bind(&input.department)
            .bind(&input.employee_id)
            .bind(&input.home_address)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Passenger>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM passengers WHERE id = $1");
        sqlx::query_as::<_, Passenger>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
