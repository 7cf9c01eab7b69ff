//! Bulk provisioning pipeline.
//!
//! Drives parsed uploads through schema validation, normalization and the
//! per-row provisioning saga against abstract stores, and aggregates the
//! outcomes into a [`BatchReport`](fleetops_core::bulk_import::BatchReport).
//! Concrete store adapters live in the API crate.

pub mod config;
pub mod error;
pub mod provisioner;
pub mod session;
pub mod stores;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ImportConfig;
pub use error::StoreError;
pub use provisioner::{PassengerProvisioner, ProvisionError, RowProvisioner, VehicleProvisioner};
pub use session::{ImportSession, ImportSummary, SessionDecision};
pub use stores::{
    IdentityAttributes, IdentityStore, ListingRefresher, ProfileAttributes, ProfileStore,
    VehicleStore,
};
