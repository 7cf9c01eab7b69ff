//! Row normalization: raw [`ImportRow`] to typed candidate.
//!
//! Normalization is total. Malformed or incomplete rows never panic or
//! raise; they come back as a [`SkipReason`] that names the row and every
//! offending field.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::schema::RequiredSchema;
use super::tabular::ImportRow;
use super::EntityKind;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Skip reasons
// ---------------------------------------------------------------------------

/// A cell whose value is present but cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidField {
    pub column: String,
    pub value: String,
}

/// Why a row was skipped before any write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipKind {
    /// Required cells that are empty or absent.
    MissingFields { columns: Vec<String> },
    /// Cells present but not parseable into the target type.
    InvalidFields { fields: Vec<InvalidField> },
    /// The natural key already exists in the identity store.
    AlreadyExists { key: String },
}

/// A row that will not be provisioned, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason {
    pub line: usize,
    pub kind: SkipKind,
}

impl SkipReason {
    pub fn missing(line: usize, columns: Vec<String>) -> Self {
        Self {
            line,
            kind: SkipKind::MissingFields { columns },
        }
    }

    pub fn invalid(line: usize, fields: Vec<InvalidField>) -> Self {
        Self {
            line,
            kind: SkipKind::InvalidFields { fields },
        }
    }

    pub fn already_exists(line: usize, key: impl Into<String>) -> Self {
        Self {
            line,
            kind: SkipKind::AlreadyExists { key: key.into() },
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            SkipKind::MissingFields { columns } => {
                write!(f, "Fila {}: Faltan los campos: {}", self.line, columns.join(", "))
            }
            SkipKind::InvalidFields { fields } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{}: '{}'", field.column, field.value))
                    .collect();
                write!(f, "Fila {}: Valor inválido en {}", self.line, parts.join(", "))
            }
            SkipKind::AlreadyExists { key } => {
                write!(f, "Fila {} ({key}): Ya existe una cuenta con este email.", self.line)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A typed record that can be built from a complete [`ImportRow`].
pub trait NormalizedCandidate: Sized {
    const KIND: EntityKind;

    /// Build the candidate from a row whose required cells are all non-empty.
    ///
    /// Returns the cells that are present but invalid.
    fn from_complete_row(row: &ImportRow) -> Result<Self, Vec<InvalidField>>;

    /// Natural key shown next to the row number in failure details.
    fn key(&self) -> &str;
}

/// Typed passenger account request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassengerCandidate {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub department: String,
    pub employee_id: String,
    pub home_address: String,
}

impl NormalizedCandidate for PassengerCandidate {
    const KIND: EntityKind = EntityKind::Passenger;

    fn from_complete_row(row: &ImportRow) -> Result<Self, Vec<InvalidField>> {
        Ok(Self {
            email: trimmed(row, "email"),
            // Secrets are passed through exactly as written.
            password: row.get("password").unwrap_or_default().to_string(),
            full_name: trimmed(row, "full_name"),
            phone: trimmed(row, "phone"),
            department: trimmed(row, "department"),
            employee_id: trimmed(row, "employee_id"),
            home_address: trimmed(row, "home_address"),
        })
    }

    fn key(&self) -> &str {
        &self.email
    }
}

/// Accepted fuel types, in their canonical spelling.
pub const FUEL_TYPES: &[&str] = &["Gasolina", "Diesel", "Eléctrico"];

/// Accepted vehicle statuses.
pub const VEHICLE_STATUSES: &[&str] = &["active", "maintenance", "inactive"];

/// Months added to the import time when `next_maintenance` is blank.
pub const MAINTENANCE_INTERVAL_MONTHS: u32 = 6;

/// Typed vehicle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleCandidate {
    pub plate_number: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub capacity: i32,
    pub fuel_type: String,
    pub status: String,
    pub last_maintenance: Timestamp,
    pub next_maintenance: Timestamp,
}

/// Fill in blank maintenance dates.
///
/// A blank `last` becomes `now`; a blank `next` becomes `now` plus
/// [`MAINTENANCE_INTERVAL_MONTHS`].
pub fn maintenance_dates(
    last: Option<Timestamp>,
    next: Option<Timestamp>,
    now: Timestamp,
) -> (Timestamp, Timestamp) {
    let last = last.unwrap_or(now);
    let next = next.unwrap_or_else(|| {
        now.checked_add_months(Months::new(MAINTENANCE_INTERVAL_MONTHS))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    });
    (last, next)
}

impl NormalizedCandidate for VehicleCandidate {
    const KIND: EntityKind = EntityKind::Vehicle;

    fn from_complete_row(row: &ImportRow) -> Result<Self, Vec<InvalidField>> {
        let mut invalid = Vec::new();

        let year = parse_in_range(row, "year", 1900..=2100, &mut invalid);
        let capacity = parse_in_range(row, "capacity", 1..=100, &mut invalid);

        let fuel_raw = trimmed(row, "fuel_type");
        let fuel_type = FUEL_TYPES
            .iter()
            .find(|f| f.to_lowercase() == fuel_raw.to_lowercase())
            .map(|f| f.to_string());
        if fuel_type.is_none() {
            invalid.push(InvalidField {
                column: "fuel_type".to_string(),
                value: fuel_raw,
            });
        }

        let status_raw = trimmed(row, "status").to_lowercase();
        if !VEHICLE_STATUSES.contains(&status_raw.as_str()) {
            invalid.push(InvalidField {
                column: "status".to_string(),
                value: status_raw.clone(),
            });
        }

        let last_maintenance = parse_optional_date(row, "last_maintenance", &mut invalid);
        let next_maintenance = parse_optional_date(row, "next_maintenance", &mut invalid);

        match (year, capacity, fuel_type) {
            (Some(year), Some(capacity), Some(fuel_type)) if invalid.is_empty() => {
                let (last_maintenance, next_maintenance) =
                    maintenance_dates(last_maintenance, next_maintenance, Utc::now());
                Ok(Self {
                    plate_number: trimmed(row, "plate_number").to_uppercase(),
                    brand: trimmed(row, "brand"),
                    model: trimmed(row, "model"),
                    year,
                    capacity,
                    fuel_type,
                    status: status_raw,
                    last_maintenance,
                    next_maintenance,
                })
            }
            _ => Err(invalid),
        }
    }

    fn key(&self) -> &str {
        &self.plate_number
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert a raw row into a typed candidate, or explain why it is skipped.
///
/// A cell counts as missing when it is absent or contains only whitespace.
/// Missing cells are reported before any type conversion is attempted.
pub fn normalize<C: NormalizedCandidate>(
    row: &ImportRow,
    required: &RequiredSchema,
) -> Result<C, SkipReason> {
    let missing: Vec<String> = required
        .columns()
        .iter()
        .filter(|col| row.get(col).map_or(true, |v| v.trim().is_empty()))
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(SkipReason::missing(row.line(), missing));
    }

    C::from_complete_row(row).map_err(|fields| SkipReason::invalid(row.line(), fields))
}

fn trimmed(row: &ImportRow, column: &str) -> String {
    row.get(column).unwrap_or_default().trim().to_string()
}

/// Parse an optional date cell as RFC 3339 or `YYYY-MM-DD` (midnight UTC).
///
/// A blank or absent cell is `None`; an unreadable one is recorded as invalid.
fn parse_optional_date(
    row: &ImportRow,
    column: &str,
    invalid: &mut Vec<InvalidField>,
) -> Option<Timestamp> {
    let raw = trimmed(row, column);
    if raw.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });
    if parsed.is_none() {
        invalid.push(InvalidField {
            column: column.to_string(),
            value: raw,
        });
    }
    parsed
}

fn parse_in_range(
    row: &ImportRow,
    column: &str,
    range: std::ops::RangeInclusive<i32>,
    invalid: &mut Vec<InvalidField>,
) -> Option<i32> {
    let raw = trimmed(row, column);
    match raw.parse::<i32>() {
        Ok(value) if range.contains(&value) => Some(value),
        _ => {
            invalid.push(InvalidField {
                column: column.to_string(),
                value: raw,
            });
            None
        }
    }
}
