//! Patient risk scoring: feature extraction over recent symptom history and
//! the tiered decision policy (critical override, symptom burden, classifier).

pub mod classifier;
pub mod engine;
pub mod features;
pub mod messages;
pub mod source;
pub mod types;

pub use classifier::{load_classifier, ClassifierLoadError, ModelArtifact, RiskClassifier};
pub use engine::{PatientDashboard, RiskEngine};
pub use features::{extract_features, FeatureSchema, FeatureVector};
pub use source::{PatientDataSource, SqliteSource, Window};
pub use types::{RiskAssessment, RiskBasis, RiskError};
