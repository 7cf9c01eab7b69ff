use std::sync::Arc;

use fleetops_pipeline::{ListingRefresher, PassengerProvisioner, VehicleProvisioner};

use crate::config::ServerConfig;
use crate::stores::{EventBusRefresher, PgIdentityStore, PgProfileStore, PgVehicleStore};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything inside is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: fleetops_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// In-process event bus for listing refreshes and run notifications.
    pub event_bus: Arc<fleetops_events::EventBus>,
}

impl AppState {
    /// Passenger saga wired to the Postgres identity and profile stores.
    pub fn passenger_provisioner(&self) -> PassengerProvisioner {
        PassengerProvisioner::new(
            Arc::new(PgIdentityStore::new(
                self.pool.clone(),
                self.config.import.min_password_length,
            )),
            Arc::new(PgProfileStore::new(self.pool.clone())),
            &self.config.import,
        )
    }

    pub fn vehicle_provisioner(&self) -> VehicleProvisioner {
        VehicleProvisioner::new(
            Arc::new(PgVehicleStore::new(self.pool.clone())),
            &self.config.import,
        )
    }

    pub fn listing_refresher(&self) -> Arc<dyn ListingRefresher> {
        Arc::new(EventBusRefresher::new(Arc::clone(&self.event_bus)))
    }
}
