//! In-memory store fakes for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use fleetops_core::bulk_import::{EntityKind, PassengerCandidate, VehicleCandidate};
use fleetops_core::types::DbId;

use crate::error::StoreError;
use crate::stores::{
    IdentityAttributes, IdentityStore, ListingRefresher, ProfileAttributes, ProfileStore,
    VehicleStore,
};

pub fn passenger(email: &str, employee_id: &str) -> PassengerCandidate {
    PassengerCandidate {
        email: email.to_string(),
        password: "secret1".to_string(),
        full_name: "Test Passenger".to_string(),
        phone: "555-0000".to_string(),
        department: "Operaciones".to_string(),
        employee_id: employee_id.to_string(),
        home_address: "Calle 1".to_string(),
    }
}

pub fn vehicle(plate: &str) -> VehicleCandidate {
    VehicleCandidate {
        plate_number: plate.to_string(),
        brand: "Mercedes".to_string(),
        model: "Sprinter".to_string(),
        year: 2022,
        capacity: 18,
        fuel_type: "Diesel".to_string(),
        status: "active".to_string(),
        last_maintenance: Utc::now(),
        next_maintenance: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Default)]
struct IdentityState {
    next_id: DbId,
    accounts: HashMap<String, DbId>,
    rejected: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    stalls: HashMap<String, Duration>,
    deleted: Vec<DbId>,
    delete_failure: Option<String>,
    create_calls: usize,
}

/// Identity store that keeps accounts in a map.
///
/// Creating an email that already exists fails with
/// `"User already registered"`.
#[derive(Default)]
pub struct FakeIdentityStore {
    state: Mutex<IdentityState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeIdentityStore {
    pub fn seed_account(&self, email: &str) -> DbId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.accounts.insert(email.to_string(), id);
        id
    }

    pub fn reject_email(&self, email: &str, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.rejected.insert(email.to_string(), message.to_string());
    }

    /// Delay `create_account` for `email` by `delay`.
    pub fn delay_email(&self, email: &str, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.delays.insert(email.to_string(), delay);
    }

    /// Commit the account for `email`, then hold the call open for `stall`.
    pub fn stall_after_commit(&self, email: &str, stall: Duration) {
        let mut state = self.state.lock().unwrap();
        state.stalls.insert(email.to_string(), stall);
    }

    pub fn fail_deletes(&self, message: &str) {
        self.state.lock().unwrap().delete_failure = Some(message.to_string());
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.state.lock().unwrap().accounts.contains_key(email)
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    pub fn deleted(&self) -> Vec<DbId> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    /// Highest number of `create_account` calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for FakeIdentityStore {
    async fn create_account(
        &self,
        email: &str,
        _secret: &str,
        _attributes: &IdentityAttributes,
    ) -> Result<DbId, StoreError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.create_calls += 1;
            state.delays.get(email).copied()
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let (id, stall) = {
            let mut state = self.state.lock().unwrap();
            if let Some(message) = state.rejected.get(email) {
                return Err(StoreError::Rejected(message.clone()));
            }
            if state.accounts.contains_key(email) {
                return Err(StoreError::Rejected("User already registered".into()));
            }
            state.next_id += 1;
            let id = state.next_id;
            state.accounts.insert(email.to_string(), id);
            (id, state.stalls.get(email).copied())
        };

        if let Some(stall) = stall {
            tokio::time::sleep(stall).await;
        }
        Ok(id)
    }

    async fn delete_account(&self, identity_id: DbId) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.delete_failure {
            return Err(StoreError::Unavailable(message.clone()));
        }
        state.accounts.retain(|_, id| *id != identity_id);
        state.deleted.push(identity_id);
        Ok(())
    }

    async fn find_account(&self, email: &str) -> Result<Option<DbId>, StoreError> {
        Ok(self.state.lock().unwrap().accounts.get(email).copied())
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ProfileState {
    profiles: Vec<(DbId, ProfileAttributes)>,
    rejected: HashMap<String, String>,
    delay: Option<Duration>,
}

#[derive(Default)]
pub struct FakeProfileStore {
    state: Mutex<ProfileState>,
}

impl FakeProfileStore {
    pub fn reject_employee(&self, employee_id: &str, message: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .rejected
            .insert(employee_id.to_string(), message.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn profile_owners(&self) -> Vec<DbId> {
        let state = self.state.lock().unwrap();
        state.profiles.iter().map(|(id, _)| *id).collect()
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn create_profile(
        &self,
        identity_id: DbId,
        attributes: &ProfileAttributes,
    ) -> Result<(), StoreError> {
        let delay = self.state.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.rejected.get(&attributes.employee_id) {
            return Err(StoreError::Rejected(message.clone()));
        }
        state.profiles.push((identity_id, attributes.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeVehicleStore {
    plates: Mutex<Vec<String>>,
    rejected: Mutex<HashMap<String, String>>,
}

impl FakeVehicleStore {
    pub fn reject_plate(&self, plate: &str, message: &str) {
        self.rejected
            .lock()
            .unwrap()
            .insert(plate.to_string(), message.to_string());
    }

    pub fn plates(&self) -> Vec<String> {
        self.plates.lock().unwrap().clone()
    }
}

#[async_trait]
impl VehicleStore for FakeVehicleStore {
    async fn create_vehicle(&self, vehicle: &VehicleCandidate) -> Result<DbId, StoreError> {
        if let Some(message) = self.rejected.lock().unwrap().get(&vehicle.plate_number) {
            return Err(StoreError::Rejected(message.clone()));
        }
        let mut plates = self.plates.lock().unwrap();
        plates.push(vehicle.plate_number.clone());
        Ok(plates.len() as DbId)
    }
}

// ---------------------------------------------------------------------------
// Refresher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingRefresher {
    refreshed: Mutex<Vec<EntityKind>>,
    fail: Mutex<HashSet<EntityKind>>,
}

impl RecordingRefresher {
    pub fn fail_for(&self, kind: EntityKind) {
        self.fail.lock().unwrap().insert(kind);
    }

    pub fn refreshed(&self) -> Vec<EntityKind> {
        self.refreshed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingRefresher for RecordingRefresher {
    async fn refresh(&self, kind: EntityKind) -> Result<(), StoreError> {
        self.refreshed.lock().unwrap().push(kind);
        if self.fail.lock().unwrap().contains(&kind) {
            return Err(StoreError::Unavailable("bus closed".into()));
        }
        Ok(())
    }
}
