//! Event names published on the bus.

use fleetops_core::bulk_import::EntityKind;

/// Suffix of the event that tells dashboards to reload a listing.
pub const LISTING_REFRESH_SUFFIX: &str = "listing_refresh";

/// An import run reached a terminal status.
pub const IMPORT_RUN_FINISHED: &str = "import.run_finished";

/// Event name asking dashboards to reload the listing for `kind`,
/// e.g. `"passengers.listing_refresh"`.
pub fn listing_refresh(kind: EntityKind) -> String {
    format!("{}.{LISTING_REFRESH_SUFFIX}", kind.listing())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_event_is_named_after_the_listing() {
        assert_eq!(
            listing_refresh(EntityKind::Passenger),
            "passengers.listing_refresh"
        );
        assert_eq!(listing_refresh(EntityKind::Vehicle), "vehicles.listing_refresh");
    }
}
