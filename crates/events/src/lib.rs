//! In-process event bus for the fleet operations backend.
//!
//! - [`EventBus`] -- publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the event envelope.
//! - [`event_types`] -- names of the events the import pipeline emits.

pub mod bus;
pub mod event_types;

pub use bus::{DomainEvent, EventBus};
