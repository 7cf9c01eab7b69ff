//! Required-column contracts and whole-batch header validation.

use std::collections::HashSet;

use super::EntityKind;

/// Columns a passenger import must carry.
pub const PASSENGER_COLUMNS: &[&str] = &[
    "email",
    "password",
    "full_name",
    "phone",
    "department",
    "employee_id",
    "home_address",
];

/// Columns a vehicle import must carry.
pub const VEHICLE_COLUMNS: &[&str] = &[
    "plate_number",
    "brand",
    "model",
    "year",
    "capacity",
    "fuel_type",
    "status",
];

/// The fixed set of columns an import of one entity kind requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredSchema {
    kind: EntityKind,
    columns: &'static [&'static str],
}

impl RequiredSchema {
    pub const PASSENGER: Self = Self {
        kind: EntityKind::Passenger,
        columns: PASSENGER_COLUMNS,
    };

    pub const VEHICLE: Self = Self {
        kind: EntityKind::Vehicle,
        columns: VEHICLE_COLUMNS,
    };

    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Passenger => Self::PASSENGER,
            EntityKind::Vehicle => Self::VEHICLE,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Required column names, in contract order.
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }
}

/// The header is missing one or more required columns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Faltan las siguientes columnas en el CSV: {}", .missing.join(", "))]
pub struct SchemaError {
    /// Every missing column, in contract order.
    pub missing: Vec<String>,
}

/// Check that `columns` is a superset of the required schema.
///
/// Reports every missing column, not just the first one.
pub fn validate_columns<S: AsRef<str>>(
    columns: &[S],
    required: &RequiredSchema,
) -> Result<(), SchemaError> {
    let present: HashSet<&str> = columns.iter().map(|c| c.as_ref()).collect();
    let missing: Vec<String> = required
        .columns()
        .iter()
        .filter(|col| !present.contains(*col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_passenger_header_passes() {
        assert!(validate_columns(PASSENGER_COLUMNS, &RequiredSchema::PASSENGER).is_ok());
    }

    #[test]
    fn extra_columns_are_allowed() {
        let mut columns: Vec<&str> = VEHICLE_COLUMNS.to_vec();
        columns.push("notes");
        assert!(validate_columns(&columns, &RequiredSchema::VEHICLE).is_ok());
    }

    #[test]
    fn reports_every_missing_column() {
        let columns = ["email", "full_name", "phone", "department"];
        let err = validate_columns(&columns, &RequiredSchema::PASSENGER).unwrap_err();

        assert_eq!(err.missing, vec!["password", "employee_id", "home_address"]);
        assert_eq!(
            err.to_string(),
            "Faltan las siguientes columnas en el CSV: password, employee_id, home_address"
        );
    }

    #[test]
    fn column_order_does_not_matter() {
        let mut columns: Vec<&str> = PASSENGER_COLUMNS.to_vec();
        columns.reverse();
        assert!(validate_columns(&columns, &RequiredSchema::PASSENGER).is_ok());
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let columns = [
            "Email",
            "password",
            "full_name",
            "phone",
            "department",
            "employee_id",
            "home_address",
        ];
        let err = validate_columns(&columns, &RequiredSchema::PASSENGER).unwrap_err();
        assert_eq!(err.missing, vec!["email"]);
    }

    #[test]
    fn schema_for_kind() {
        assert_eq!(RequiredSchema::for_kind(EntityKind::Vehicle), RequiredSchema::VEHICLE);
        assert_eq!(RequiredSchema::PASSENGER.kind(), EntityKind::Passenger);
    }
}
