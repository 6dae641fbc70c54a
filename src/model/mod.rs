pub mod forest;
pub mod linear;

pub use forest::{GradientBoostingModel, RegressionTree, TreeNode};
pub use linear::LinearModel;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::PredictionServiceError;
use crate::features::{FeatureVector, Field};

/// A trained regression model.
pub trait Predictor {
    /// Score one feature vector. Implementations must not panic on odd input;
    /// every failure comes back as an error.
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionServiceError>;

    /// One-line summary for verbose output and the `check` command.
    fn describe(&self) -> String;
}

/// Call the model and reject output the rest of the pipeline cannot use.
pub fn predict_checked(
    predictor: &dyn Predictor,
    features: &FeatureVector,
) -> Result<f64, PredictionServiceError> {
    let value = predictor.predict(features)?;
    if !value.is_finite() {
        return Err(PredictionServiceError::new(format!(
            "model returned a non-finite value ({})",
            value
        )));
    }
    Ok(value)
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    Linear(LinearModel),
    GradientBoosting(GradientBoostingModel),
}

/// On-disk model description.
///
/// Example JSON:
/// ```json
/// {
///   "feature_names": ["age", "sex", "bmi", "bp", "s1", "s2", "s3", "s4", "s5", "s6"],
///   "model": { "kind": "linear", "intercept": 152.13, "coefficients": { "bmi": 519.85 } }
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    /// Column order the model was trained with, when the exporter recorded it
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,

    pub model: ModelKind,
}

impl ModelFile {
    /// The recorded column order must be exactly ours; a reordered file would
    /// silently corrupt every prediction.
    pub fn check_feature_names(&self) -> Result<()> {
        let Some(names) = &self.feature_names else {
            return Ok(());
        };
        let expected: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        if names.len() != expected.len() || names.iter().zip(&expected).any(|(a, b)| a != b) {
            anyhow::bail!(
                "Model feature order [{}] does not match expected [{}]",
                names.join(", "),
                expected.join(", ")
            );
        }
        Ok(())
    }

    pub fn into_predictor(self) -> Box<dyn Predictor> {
        match self.model {
            ModelKind::Linear(m) => Box::new(m),
            ModelKind::GradientBoosting(m) => Box::new(m),
        }
    }
}

/// Load a model from a JSON file
///
/// # Errors
///
/// Returns an error if:
/// - The model file does not exist or cannot be read
/// - The JSON cannot be parsed
/// - The recorded feature order differs from the expected column order
pub fn load_model(path: &Path) -> Result<Box<dyn Predictor>> {
    if !path.exists() {
        anyhow::bail!("Model file not found at {}", path.display());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open model file at {}", path.display()))?;

    let model_file: ModelFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse model: invalid JSON in {}", path.display()))?;

    model_file.check_feature_names()?;

    Ok(model_file.into_predictor())
}
