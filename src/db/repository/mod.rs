//! Repository layer: entity-scoped database operations.

mod appointment;
mod patient;
mod symptom;

use chrono::NaiveDate;
use uuid::Uuid;

use super::DatabaseError;

pub use appointment::*;
pub use patient::*;
pub use symptom::*;

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid date {value}: {e}")))
}
