//! Tiered risk decision policy.
//!
//! Tiers run in order and the first one that fires wins:
//! 1. any high-risk symptom inside the critical window → high
//! 2. non-high-risk records inside the critical window ≥ threshold → medium
//! 3. classifier over the feature window, or "model unavailable"

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::features::{extract_features, FeatureVector};
use super::messages::MessageTemplates;
use super::source::{PatientDataSource, Window};
use super::types::{RiskAssessment, RiskBasis, RiskError};
use crate::models::enums::{RiskLevel, SymptomKind};
use crate::models::{AppointmentBooking, Patient, SymptomRecord};
use crate::state::{ClassifierState, RiskState};

const HIGH_SCORE: f64 = 1.0;
const MEDIUM_SCORE: f64 = 0.5;

/// Everything the patient dashboard shows next to the risk panel.
#[derive(Debug, Clone, Serialize)]
pub struct PatientDashboard {
    pub patient: Patient,
    pub assessment: RiskAssessment,
    pub bookings: Vec<AppointmentBooking>,
}

pub struct RiskEngine {
    state: Arc<RiskState>,
}

impl RiskEngine {
    pub fn new(state: Arc<RiskState>) -> Self {
        Self { state }
    }

    /// Evaluate one patient at `now`. Read-only; safe to call concurrently.
    pub fn evaluate(
        &self,
        source: &dyn PatientDataSource,
        patient_id: &Uuid,
        now: NaiveDateTime,
    ) -> Result<RiskAssessment, RiskError> {
        let patient = self.require_patient(source, patient_id)?;
        self.assess(source, &patient, now)
    }

    /// Risk assessment plus the patient's bookings.
    pub fn dashboard(
        &self,
        source: &dyn PatientDataSource,
        patient_id: &Uuid,
        now: NaiveDateTime,
    ) -> Result<PatientDashboard, RiskError> {
        let patient = self.require_patient(source, patient_id)?;
        let assessment = self.assess(source, &patient, now)?;
        let bookings = source.bookings_for(patient_id)?;
        Ok(PatientDashboard {
            patient,
            assessment,
            bookings,
        })
    }

    fn require_patient(
        &self,
        source: &dyn PatientDataSource,
        patient_id: &Uuid,
    ) -> Result<Patient, RiskError> {
        match source.find_patient(patient_id)? {
            Some(patient) => Ok(patient),
            None => {
                tracing::info!(patient_id = %patient_id, "No patient profile, risk not assessed");
                Err(RiskError::PatientNotFound(*patient_id))
            }
        }
    }

    fn assess(
        &self,
        source: &dyn PatientDataSource,
        patient: &Patient,
        now: NaiveDateTime,
    ) -> Result<RiskAssessment, RiskError> {
        let config = self.state.config();
        let critical_window = Window::trailing(now, config.critical_window());
        let recent = source.symptoms_between(&patient.id, &critical_window)?;

        if let Some(assessment) = self.critical_override(&recent) {
            tracing::debug!(patient_id = %patient.id, tier = 1, "Critical symptom override");
            return Ok(assessment);
        }
        if let Some(assessment) = self.burden_override(&recent) {
            tracing::debug!(patient_id = %patient.id, tier = 2, "Symptom burden override");
            return Ok(assessment);
        }
        self.statistical(source, patient, now)
    }

    fn critical_override(&self, recent: &[SymptomRecord]) -> Option<RiskAssessment> {
        let triggering: BTreeSet<SymptomKind> = recent
            .iter()
            .map(|r| r.symptom)
            .filter(SymptomKind::is_high_risk)
            .collect();
        if triggering.is_empty() {
            return None;
        }

        let symptoms: Vec<SymptomKind> = triggering.into_iter().collect();
        Some(RiskAssessment {
            risk_level: RiskLevel::High,
            score: HIGH_SCORE,
            message: MessageTemplates::critical(&symptoms),
            basis: RiskBasis::CriticalSymptoms { symptoms },
        })
    }

    fn burden_override(&self, recent: &[SymptomRecord]) -> Option<RiskAssessment> {
        let count = recent.iter().filter(|r| !r.symptom.is_high_risk()).count();
        if count < self.state.config().burden_threshold {
            return None;
        }

        Some(RiskAssessment {
            risk_level: RiskLevel::Medium,
            score: MEDIUM_SCORE,
            message: MessageTemplates::symptom_burden(count),
            basis: RiskBasis::SymptomBurden { count },
        })
    }

    fn statistical(
        &self,
        source: &dyn PatientDataSource,
        patient: &Patient,
        now: NaiveDateTime,
    ) -> Result<RiskAssessment, RiskError> {
        let model = match self.state.classifier_state() {
            ClassifierState::Loaded(model) => model,
            ClassifierState::Unavailable { reason } => {
                tracing::warn!(patient_id = %patient.id, reason = %reason, "Risk model unavailable");
                return Ok(RiskAssessment {
                    risk_level: RiskLevel::Low,
                    score: 0.0,
                    message: MessageTemplates::model_unavailable(),
                    basis: RiskBasis::ModelUnavailable {
                        reason: reason.clone(),
                    },
                });
            }
        };

        let config = self.state.config();
        let window = Window::trailing(now, config.feature_window());
        let records = source.symptoms_between(&patient.id, &window)?;
        let features = extract_features(self.state.schema(), patient.age, &records, now, config);

        let probability = model.predict_probability(&features)?;
        if !probability.is_finite() {
            return Err(RiskError::Inference(format!(
                "classifier returned {probability}"
            )));
        }

        tracing::debug!(
            patient_id = %patient.id,
            tier = 3,
            records = records.len(),
            probability,
            "Classifier scored patient"
        );
        Ok(self.grade(probability, records.len(), features))
    }

    /// Map a classifier probability onto level and score.
    ///
    /// Thresholds are strict: a probability equal to the high threshold is medium.
    pub fn grade(
        &self,
        probability: f64,
        records_in_window: usize,
        features: FeatureVector,
    ) -> RiskAssessment {
        let config = self.state.config();
        let (risk_level, score, message) = if probability > config.high_threshold {
            (RiskLevel::High, HIGH_SCORE, MessageTemplates::model_high())
        } else if probability > config.medium_threshold {
            (RiskLevel::Medium, MEDIUM_SCORE, MessageTemplates::model_medium())
        } else {
            (
                RiskLevel::Low,
                probability * config.low_score_factor,
                MessageTemplates::model_low(),
            )
        };

        RiskAssessment {
            risk_level,
            score,
            message,
            basis: RiskBasis::Model {
                probability,
                records_in_window,
                features,
            },
        }
    }
}
