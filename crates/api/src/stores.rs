//! Postgres and event-bus implementations of the pipeline store traits.

use std::sync::Arc;

use async_trait::async_trait;
use fleetops_core::bulk_import::{EntityKind, VehicleCandidate};
use fleetops_core::passenger::is_valid_email;
use fleetops_core::types::DbId;
use fleetops_db::models::passenger::CreatePassenger;
use fleetops_db::models::user::CreateUser;
use fleetops_db::models::vehicle::CreateVehicle;
use fleetops_db::repositories::{PassengerRepo, UserRepo, VehicleRepo};
use fleetops_db::DbPool;
use fleetops_events::{event_types, DomainEvent, EventBus};
use fleetops_pipeline::{
    IdentityAttributes, IdentityStore, ListingRefresher, ProfileAttributes, ProfileStore,
    StoreError, VehicleStore,
};

use crate::auth::password::{hash_password, validate_password_strength};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "User already registered";
pub const INVALID_EMAIL_MESSAGE: &str = "Unable to validate email address: invalid format";
pub const DUPLICATE_PLATE_MESSAGE: &str = "Ya existe un vehículo con esta placa.";

/// Map a sqlx failure to a store error.
///
/// Database-side rejections keep the server's message verbatim; anything
/// else means the database was not usable.
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Rejected(db_err.message().to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Accounts in the `users` table, with Argon2id password hashes.
pub struct PgIdentityStore {
    pool: DbPool,
    min_password_length: usize,
}

impl PgIdentityStore {
    pub fn new(pool: DbPool, min_password_length: usize) -> Self {
        Self {
            pool,
            min_password_length,
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create_account(
        &self,
        email: &str,
        secret: &str,
        attributes: &IdentityAttributes,
    ) -> Result<DbId, StoreError> {
        if !is_valid_email(email) {
            return Err(StoreError::Rejected(INVALID_EMAIL_MESSAGE.to_string()));
        }
        validate_password_strength(secret, self.min_password_length)
            .map_err(StoreError::Rejected)?;

        let secret = secret.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&secret))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map_err(|e| StoreError::Unavailable(format!("password hashing failed: {e}")))?;

        let input = CreateUser {
            email: email.to_string(),
            password_hash,
            full_name: attributes.full_name.clone(),
            phone: Some(attributes.phone.clone()),
            role: attributes.role.clone(),
            avatar_url: Some(attributes.avatar_url.clone()),
        };

        match UserRepo::create(&self.pool, &input).await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, email, "Account created");
                Ok(user.id)
            }
            Err(err) if violates(&err, "uq_users_email") => {
                Err(StoreError::Rejected(DUPLICATE_EMAIL_MESSAGE.to_string()))
            }
            Err(err) => Err(store_error(err)),
        }
    }

    async fn delete_account(&self, identity_id: DbId) -> Result<(), StoreError> {
        let deleted = UserRepo::delete(&self.pool, identity_id)
            .await
            .map_err(store_error)?;
        if !deleted {
            return Err(StoreError::Rejected(format!(
                "account {identity_id} does not exist"
            )));
        }
        Ok(())
    }

    async fn find_account(&self, email: &str) -> Result<Option<DbId>, StoreError> {
        let user = UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(store_error)?;
        Ok(user.map(|u| u.id))
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Passenger profiles in the `passengers` table.
pub struct PgProfileStore {
    pool: DbPool,
}

impl PgProfileStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn create_profile(
        &self,
        identity_id: DbId,
        attributes: &ProfileAttributes,
    ) -> Result<(), StoreError> {
        let input = CreatePassenger {
            user_id: identity_id,
            department: attributes.department.clone(),
            employee_id: attributes.employee_id.clone(),
            home_address: attributes.home_address.clone(),
        };
        PassengerRepo::create(&self.pool, &input)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

pub struct PgVehicleStore {
    pool: DbPool,
}

impl PgVehicleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn create_vehicle(&self, vehicle: &VehicleCandidate) -> Result<DbId, StoreError> {
        let input = CreateVehicle {
            plate_number: vehicle.plate_number.clone(),
            brand: vehicle.brand.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            capacity: vehicle.capacity,
            fuel_type: vehicle.fuel_type.clone(),
            status: vehicle.status.clone(),
            last_maintenance: Some(vehicle.last_maintenance),
            next_maintenance: Some(vehicle.next_maintenance),
        };
        match VehicleRepo::create(&self.pool, &input).await {
            Ok(created) => Ok(created.id),
            Err(err) if violates(&err, "uq_vehicles_plate_number") => {
                Err(StoreError::Rejected(DUPLICATE_PLATE_MESSAGE.to_string()))
            }
            Err(err) => Err(store_error(err)),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing refresh
// ---------------------------------------------------------------------------

/// Announces listing changes on the in-process event bus.
pub struct EventBusRefresher {
    bus: Arc<EventBus>,
}

impl EventBusRefresher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ListingRefresher for EventBusRefresher {
    async fn refresh(&self, kind: EntityKind) -> Result<(), StoreError> {
        let event = DomainEvent::new(event_types::listing_refresh(kind))
            .with_payload(serde_json::json!({ "listing": kind.listing() }));
        self.bus.publish(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresher_publishes_listing_event() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let refresher = EventBusRefresher::new(Arc::clone(&bus));

        refresher.refresh(EntityKind::Passenger).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "passengers.listing_refresh");
        assert_eq!(event.payload["listing"], "passengers");
    }

    #[test]
    fn non_database_errors_are_unavailable() {
        assert!(matches!(
            store_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }
}
