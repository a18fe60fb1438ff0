//! Classifier contract and artifact loading.
//!
//! An artifact is addressed by directory and name, mirroring how it is
//! exported: `<dir>/<name>.json` (decision forest) or `<dir>/<name>.onnx`
//! (behind the `onnx` feature), always next to `<dir>/features.json`, the
//! ordered column list the model was trained on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::features::FeatureVector;
use super::types::RiskError;

/// Probability model scoring a feature vector for the severe-outcome class.
pub trait RiskClassifier: Send + Sync {
    /// Ordered column names the model expects.
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class, in [0, 1].
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, RiskError>;
}

#[derive(Error, Debug)]
pub enum ClassifierLoadError {
    #[error("Classifier artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read classifier artifact {0}: {1}")]
    Read(String, String),

    #[error("Cannot parse classifier artifact {0}: {1}")]
    Parse(String, String),

    #[error("Invalid classifier artifact: {0}")]
    Invalid(String),

    #[error("Classifier runtime initialisation failed: {0}")]
    Runtime(String),
}

/// Location of a trained classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    pub dir: PathBuf,
    pub name: String,
}

impl ModelArtifact {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn features_path(&self) -> PathBuf {
        self.dir.join("features.json")
    }

    pub fn forest_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }

    pub fn onnx_path(&self) -> PathBuf {
        self.dir.join(format!("{}.onnx", self.name))
    }
}

/// Load the classifier named by `artifact`.
pub fn load_classifier(
    artifact: &ModelArtifact,
) -> Result<Box<dyn RiskClassifier>, ClassifierLoadError> {
    let feature_names = read_feature_names(&artifact.features_path())?;

    let forest_path = artifact.forest_path();
    if forest_path.exists() {
        let forest = ForestClassifier::load(&forest_path, feature_names)?;
        tracing::info!(
            path = %forest_path.display(),
            trees = forest.trees.len(),
            "Decision forest classifier loaded"
        );
        return Ok(Box::new(forest));
    }

    #[cfg(feature = "onnx")]
    {
        let onnx_path = artifact.onnx_path();
        if onnx_path.exists() {
            let model = onnx::OnnxClassifier::load(&onnx_path, feature_names)?;
            return Ok(Box::new(model));
        }
    }

    Err(ClassifierLoadError::NotFound(forest_path))
}

fn read_feature_names(path: &Path) -> Result<Vec<String>, ClassifierLoadError> {
    if !path.exists() {
        return Err(ClassifierLoadError::NotFound(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path)
        .map_err(|e| ClassifierLoadError::Read(path.display().to_string(), e.to_string()))?;
    let names: Vec<String> = serde_json::from_str(&json)
        .map_err(|e| ClassifierLoadError::Parse(path.display().to_string(), e.to_string()))?;
    if names.is_empty() {
        return Err(ClassifierLoadError::Invalid("features.json lists no columns".into()));
    }
    Ok(names)
}

fn check_width(expected: usize, features: &FeatureVector) -> Result<(), RiskError> {
    if features.values().len() != expected {
        return Err(RiskError::MalformedFeatureSchema(format!(
            "classifier expects {expected} columns, got {}",
            features.values().len()
        )));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Decision forest
// ═══════════════════════════════════════════════════════════

/// One node of a flattened decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights `[negative, positive]`.
    Leaf { value: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestArtifact {
    trees: Vec<DecisionTree>,
}

/// Averaged tree ensemble, scored like a random forest's class probability.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    feature_names: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn new(
        feature_names: Vec<String>,
        trees: Vec<DecisionTree>,
    ) -> Result<Self, ClassifierLoadError> {
        let forest = Self {
            feature_names,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    pub fn load(path: &Path, feature_names: Vec<String>) -> Result<Self, ClassifierLoadError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ClassifierLoadError::Read(path.display().to_string(), e.to_string()))?;
        let artifact: ForestArtifact = serde_json::from_str(&json)
            .map_err(|e| ClassifierLoadError::Parse(path.display().to_string(), e.to_string()))?;
        Self::new(feature_names, artifact.trees)
    }

    /// Children must point forward so every walk terminates.
    fn validate(&self) -> Result<(), ClassifierLoadError> {
        if self.trees.is_empty() {
            return Err(ClassifierLoadError::Invalid("forest has no trees".into()));
        }
        let width = self.feature_names.len();

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ClassifierLoadError::Invalid(format!("tree {t} is empty")));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= width {
                            return Err(ClassifierLoadError::Invalid(format!(
                                "tree {t} node {i} splits on column {feature}, schema has {width}"
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(ClassifierLoadError::Invalid(format!(
                                "tree {t} node {i} has a non-finite threshold"
                            )));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(ClassifierLoadError::Invalid(format!(
                                    "tree {t} node {i} has out-of-order child {child}"
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        let total = value[0] + value[1];
                        if value.iter().any(|w| !w.is_finite() || *w < 0.0) || total <= 0.0 {
                            return Err(ClassifierLoadError::Invalid(format!(
                                "tree {t} leaf {i} has invalid class weights {value:?}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn tree_probability(tree: &DecisionTree, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &tree.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value[1] / (value[0] + value[1]),
            }
        }
    }
}

impl RiskClassifier for ForestClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, RiskError> {
        check_width(self.feature_names.len(), features)?;
        let x = features.values();
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| Self::tree_probability(tree, x))
            .sum();
        Ok((sum / self.trees.len() as f64).clamp(0.0, 1.0))
    }
}

// ═══════════════════════════════════════════════════════════
// ONNX classifier (`onnx` feature)
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx")]
mod onnx {
    use super::{check_width, ClassifierLoadError, FeatureVector, RiskClassifier, RiskError};
    use ort::session::Session;
    use std::path::Path;
    use std::sync::Mutex;

    /// Classifier exported to ONNX with a `[1, n]` float input and a class
    /// probability output (`[1, 2]`, positive class last).
    ///
    /// `Session::run` needs `&mut self`, hence the Mutex.
    pub struct OnnxClassifier {
        session: Mutex<Session>,
        feature_names: Vec<String>,
    }

    impl OnnxClassifier {
        pub fn load(path: &Path, feature_names: Vec<String>) -> Result<Self, ClassifierLoadError> {
            let session = Session::builder()
                .map_err(|e: ort::Error| ClassifierLoadError::Runtime(e.to_string()))?
                .with_intra_threads(1)
                .map_err(|e: ort::Error| ClassifierLoadError::Runtime(e.to_string()))?
                .commit_from_file(path)
                .map_err(|e: ort::Error| {
                    ClassifierLoadError::Runtime(format!("ONNX load failed: {e}"))
                })?;

            tracing::info!("ONNX classifier loaded from {}", path.display());

            Ok(Self {
                session: Mutex::new(session),
                feature_names,
            })
        }
    }

    impl RiskClassifier for OnnxClassifier {
        fn feature_names(&self) -> &[String] {
            &self.feature_names
        }

        fn predict_probability(&self, features: &FeatureVector) -> Result<f64, RiskError> {
            use ort::value::TensorRef;

            check_width(self.feature_names.len(), features)?;
            let row: Vec<f32> = features.values().iter().map(|v| *v as f32).collect();
            let input = ndarray::Array2::from_shape_vec((1, row.len()), row)
                .map_err(|e| RiskError::Inference(e.to_string()))?;
            let tensor = TensorRef::from_array_view(&input)
                .map_err(|e| RiskError::Inference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| RiskError::Inference("Session lock poisoned".to_string()))?;
            let outputs = session
                .run(ort::inputs![tensor])
                .map_err(|e| RiskError::Inference(format!("ONNX inference failed: {e}")))?;

            let probabilities = match outputs.get("probabilities") {
                Some(value) => value,
                None => &outputs[0],
            };
            let (_, data) = probabilities
                .try_extract_tensor::<f32>()
                .map_err(|e| RiskError::Inference(format!("Output extraction: {e}")))?;

            let positive = match data.len() {
                0 => return Err(RiskError::Inference("Empty probability output".into())),
                1 => data[0],
                _ => data[1],
            };
            Ok(f64::from(positive).clamp(0.0, 1.0))
        }
    }
}
