//! Process-wide risk state.
//!
//! `RiskState` is built once at startup, wrapped in `Arc` and shared
//! read-only by every evaluation. The classifier is never swapped in
//! place; a new model means a new `RiskState` (i.e. a restart).

use std::sync::Arc;

use crate::config::RiskConfig;
use crate::risk::classifier::{load_classifier, ModelArtifact, RiskClassifier};
use crate::risk::features::FeatureSchema;
use crate::risk::types::RiskError;

/// Whether tier 3 can run.
#[derive(Clone)]
pub enum ClassifierState {
    Loaded(Arc<dyn RiskClassifier>),
    Unavailable { reason: String },
}

impl std::fmt::Debug for ClassifierState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded(model) => f
                .debug_struct("Loaded")
                .field("columns", &model.feature_names().len())
                .finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct RiskState {
    config: RiskConfig,
    schema: &'static FeatureSchema,
    classifier: ClassifierState,
}

impl RiskState {
    /// Validate the config and load the configured classifier.
    ///
    /// A missing or unreadable artifact leaves tier 3 disabled. A loaded
    /// artifact whose columns differ from the extractor's is an error.
    pub fn initialize(config: RiskConfig) -> Result<Self, RiskError> {
        config.validate()?;
        let artifact = ModelArtifact::new(&config.model_dir, &config.model_name);

        match load_classifier(&artifact) {
            Ok(model) => Self::with_classifier(config, model),
            Err(e) => {
                tracing::warn!(
                    model_dir = %artifact.dir.display(),
                    model = %artifact.name,
                    error = %e,
                    "Classifier unavailable, statistical tier disabled"
                );
                Ok(Self::without_classifier(config, e.to_string()))
            }
        }
    }

    pub fn with_classifier(
        config: RiskConfig,
        classifier: Box<dyn RiskClassifier>,
    ) -> Result<Self, RiskError> {
        let schema = FeatureSchema::standard();
        schema.verify_matches(classifier.feature_names())?;
        tracing::info!(columns = schema.width(), "Classifier schema verified");

        Ok(Self {
            config,
            schema,
            classifier: ClassifierState::Loaded(Arc::from(classifier)),
        })
    }

    pub fn without_classifier(config: RiskConfig, reason: impl Into<String>) -> Self {
        Self {
            config,
            schema: FeatureSchema::standard(),
            classifier: ClassifierState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn schema(&self) -> &'static FeatureSchema {
        self.schema
    }

    pub fn classifier_state(&self) -> &ClassifierState {
        &self.classifier
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.classifier, ClassifierState::Unavailable { .. })
    }
}
