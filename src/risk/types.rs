use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::features::FeatureVector;
use super::messages::MessageTemplates;
use crate::config::ConfigError;
use crate::db::DatabaseError;
use crate::models::enums::{RiskLevel, SymptomKind};

// ---------------------------------------------------------------------------
// RiskBasis
// ---------------------------------------------------------------------------

/// Which tier produced an assessment, with the evidence it used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum RiskBasis {
    /// Tier 1: high-risk symptoms inside the critical window.
    CriticalSymptoms { symptoms: Vec<SymptomKind> },
    /// Tier 2: enough non-high-risk records inside the critical window.
    SymptomBurden { count: usize },
    /// Tier 3: classifier output over the feature window.
    /// `records_in_window == 0` means the zero vector was scored.
    Model {
        probability: f64,
        records_in_window: usize,
        features: FeatureVector,
    },
    /// Tier 3 without a classifier. Operational, not clinical.
    ModelUnavailable { reason: String },
}

// ---------------------------------------------------------------------------
// RiskAssessment
// ---------------------------------------------------------------------------

/// Outcome of one evaluation. `score` is a fraction in [0, 1]; the 0-100
/// display value comes from [`RiskAssessment::risk_score`] only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "RiskReport")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub score: f64,
    pub message: String,
    pub basis: RiskBasis,
}

impl RiskAssessment {
    /// Display score on the 0-100 scale.
    pub fn risk_score(&self) -> f64 {
        self.score * 100.0
    }

    /// True when the result reflects a missing classifier rather than a finding.
    pub fn is_degraded(&self) -> bool {
        matches!(self.basis, RiskBasis::ModelUnavailable { .. })
    }
}

/// Serialized shape handed to presentation.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub message: String,
    pub degraded: bool,
    pub basis: RiskBasis,
}

impl From<RiskAssessment> for RiskReport {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            risk_level: assessment.risk_level,
            risk_score: assessment.risk_score(),
            degraded: assessment.is_degraded(),
            message: assessment.message,
            basis: assessment.basis,
        }
    }
}

// ---------------------------------------------------------------------------
// RiskError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("No patient profile for {0}")]
    PatientNotFound(Uuid),

    #[error("Feature schema mismatch: {0}")]
    MalformedFeatureSchema(String),

    #[error("Classifier inference failed: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RiskError {
    /// Text suitable for the patient-facing panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::PatientNotFound(_) => MessageTemplates::no_patient_data(),
            _ => MessageTemplates::evaluation_failed(),
        }
    }
}
