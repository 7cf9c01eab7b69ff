//! Repository for the `vehicles` table.

use sqlx::PgPool;

use crate::models::vehicle::{CreateVehicle, Vehicle};

const COLUMNS: &str = "id, plate_number, brand, model, year, capacity, fuel_type, status, \
                        last_maintenance, next_maintenance, created_at, updated_at";

pub struct VehicleRepo;

impl VehicleRepo {
    /// Insert a vehicle. A reused plate fails on `uq_vehicles_plate_number`.
    pub async fn create(pool: &PgPool, input: &CreateVehicle) -> Result<Vehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles (plate_number, brand, model, year, capacity, fuel_type, status,
                                   last_maintenance, next_maintenance)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(&input.plate_number)
            .bind(&input.brand)
            .bind(&input.model)
            .bind(input.year)
            .bind(input.capacity)
            .bind(&input.fuel_type)
            .bind(&input.status)
            .bind(input.last_maintenance)
            .bind(input.next_maintenance)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_plate(
        pool: &PgPool,
        plate_number: &str,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE plate_number = $1");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(plate_number)
            .fetch_optional(pool)
            .await
    }
}
