//! Collaborator seams the pipeline writes through.
//!
//! Implementations must be safe to call concurrently. Every method is a
//! single external call; the pipeline wraps each one in its own deadline.

use async_trait::async_trait;
use fleetops_core::bulk_import::{EntityKind, PassengerCandidate, VehicleCandidate};
use fleetops_core::passenger::{avatar_url_for, PASSENGER_ROLE};
use fleetops_core::types::DbId;

use crate::error::StoreError;

/// Non-secret attributes stored with a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAttributes {
    pub full_name: String,
    pub phone: String,
    pub role: String,
    pub avatar_url: String,
}

impl IdentityAttributes {
    pub fn for_passenger(candidate: &PassengerCandidate) -> Self {
        Self {
            full_name: candidate.full_name.clone(),
            phone: candidate.phone.clone(),
            role: PASSENGER_ROLE.to_string(),
            avatar_url: avatar_url_for(&candidate.email),
        }
    }
}

/// Passenger profile attributes, keyed by the identity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileAttributes {
    pub department: String,
    pub employee_id: String,
    pub home_address: String,
}

impl ProfileAttributes {
    pub fn for_passenger(candidate: &PassengerCandidate) -> Self {
        Self {
            department: candidate.department.clone(),
            employee_id: candidate.employee_id.clone(),
            home_address: candidate.home_address.clone(),
        }
    }
}

/// Account and credential store.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create an account and return its id.
    async fn create_account(
        &self,
        email: &str,
        secret: &str,
        attributes: &IdentityAttributes,
    ) -> Result<DbId, StoreError>;

    /// Delete an account. Used only to compensate a failed provisioning.
    async fn delete_account(&self, identity_id: DbId) -> Result<(), StoreError>;

    /// Id of the account registered under `email`, if any.
    async fn find_account(&self, email: &str) -> Result<Option<DbId>, StoreError>;
}

/// Passenger profile store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(
        &self,
        identity_id: DbId,
        attributes: &ProfileAttributes,
    ) -> Result<(), StoreError>;
}

/// Vehicle registry.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn create_vehicle(&self, vehicle: &VehicleCandidate) -> Result<DbId, StoreError>;
}

/// Tells the read side that a listing changed.
#[async_trait]
pub trait ListingRefresher: Send + Sync {
    async fn refresh(&self, kind: EntityKind) -> Result<(), StoreError>;
}
