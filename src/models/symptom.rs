use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::SymptomKind;

/// Highest severity a log entry can carry (scale is 0..=3).
pub const MAX_SEVERITY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub symptom: SymptomKind,
    pub severity: u8,
    pub date_logged: NaiveDate,
}
