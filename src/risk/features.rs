//! Feature extraction over a patient's recent symptom records.
//!
//! The column set and order are declared statically in [`FeatureSchema::standard`]
//! and must equal the list shipped with the classifier artifact. Any drift is
//! reported at load time, never patched up at inference time.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::source::Window;
use super::types::RiskError;
use crate::config::RiskConfig;
use crate::models::enums::SymptomKind;
use crate::models::SymptomRecord;

// ═══════════════════════════════════════════
// Schema
// ═══════════════════════════════════════════

/// How a column's value is derived from the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    Age,
    DaysWithSymptoms,
    NonSevereCount,
    Indicator(SymptomKind),
    /// Present in the trained schema, never computed: always 0.
    Unmapped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub source: FeatureSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<FeatureColumn>,
}

static STANDARD_SCHEMA: LazyLock<FeatureSchema> = LazyLock::new(|| {
    let mut columns = vec![
        FeatureColumn {
            name: "age".into(),
            source: FeatureSource::Age,
        },
        FeatureColumn {
            name: "days_with_symptoms".into(),
            source: FeatureSource::DaysWithSymptoms,
        },
        FeatureColumn {
            name: "has_fever".into(),
            source: FeatureSource::Unmapped,
        },
        FeatureColumn {
            name: "non_severe_symptom_count".into(),
            source: FeatureSource::NonSevereCount,
        },
    ];
    columns.extend(SymptomKind::HIGH_RISK.iter().map(|kind| FeatureColumn {
        name: kind.feature_name(),
        source: FeatureSource::Indicator(*kind),
    }));
    FeatureSchema { columns }
});

impl FeatureSchema {
    /// The column layout the shipped classifier was trained on.
    pub fn standard() -> &'static FeatureSchema {
        &STANDARD_SCHEMA
    }

    pub fn new(columns: Vec<FeatureColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Identity and order must match `declared` exactly.
    pub fn verify_matches(&self, declared: &[String]) -> Result<(), RiskError> {
        let ours = self.names();
        if ours.len() == declared.len() && ours.iter().zip(declared).all(|(a, b)| *a == b) {
            return Ok(());
        }

        let ours_set: BTreeSet<&str> = ours.iter().copied().collect();
        let theirs_set: BTreeSet<&str> = declared.iter().map(String::as_str).collect();
        let missing: Vec<&str> = ours_set.difference(&theirs_set).copied().collect();
        let extra: Vec<&str> = theirs_set.difference(&ours_set).copied().collect();

        let detail = if missing.is_empty() && extra.is_empty() {
            format!("same columns in a different order: expected {ours:?}, got {declared:?}")
        } else {
            format!("classifier lacks {missing:?}, classifier adds {extra:?}")
        };
        Err(RiskError::MalformedFeatureSchema(detail))
    }
}

// ═══════════════════════════════════════════
// FeatureVector
// ═══════════════════════════════════════════

/// Values in schema order. Serializes as an ordered name → value map.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Every column set to 0.
    pub fn zero(schema: &FeatureSchema) -> Self {
        Self {
            names: schema.columns.iter().map(|c| c.name.clone()).collect(),
            values: vec![0.0; schema.width()],
        }
    }

    /// Vector over `schema` with caller-supplied values.
    pub fn from_values(schema: &FeatureSchema, values: Vec<f64>) -> Result<Self, RiskError> {
        if values.len() != schema.width() {
            return Err(RiskError::MalformedFeatureSchema(format!(
                "schema has {} columns, got {} values",
                schema.width(),
                values.len()
            )));
        }
        Ok(Self {
            names: schema.columns.iter().map(|c| c.name.clone()).collect(),
            values,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.names.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ═══════════════════════════════════════════
// Extraction
// ═══════════════════════════════════════════

/// Build the feature vector for one patient.
///
/// Only records inside the feature window ending at `now` are used. With no
/// such record the zero vector is returned, age included.
pub fn extract_features(
    schema: &FeatureSchema,
    age: Option<i32>,
    records: &[SymptomRecord],
    now: NaiveDateTime,
    config: &RiskConfig,
) -> FeatureVector {
    let window = Window::trailing(now, config.feature_window());
    let windowed: Vec<&SymptomRecord> = records
        .iter()
        .filter(|r| window.contains(r.date_logged))
        .collect();

    let Some(earliest) = windowed.iter().map(|r| r.date_logged).min() else {
        return FeatureVector::zero(schema);
    };

    let days_with_symptoms = ((now.date() - earliest).num_days() + 1).max(1);
    let non_severe = windowed.iter().filter(|r| !r.symptom.is_high_risk()).count();
    let present: BTreeSet<SymptomKind> = windowed.iter().map(|r| r.symptom).collect();

    let values = schema
        .columns
        .iter()
        .map(|column| match column.source {
            FeatureSource::Age => f64::from(age.unwrap_or(config.default_age)),
            FeatureSource::DaysWithSymptoms => days_with_symptoms as f64,
            FeatureSource::NonSevereCount => non_severe as f64,
            FeatureSource::Indicator(kind) => {
                if present.contains(&kind) {
                    1.0
                } else {
                    0.0
                }
            }
            FeatureSource::Unmapped => 0.0,
        })
        .collect();

    FeatureVector {
        names: schema.columns.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}
