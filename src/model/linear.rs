use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Predictor;
use crate::error::PredictionServiceError;
use crate::features::{FeatureVector, Field};

/// Ordinary least-squares style model: `intercept + sum(coef * x)`.
///
/// Coefficients are keyed by column name, so a model file cannot silently
/// apply a weight to the wrong feature. A column without a coefficient
/// contributes nothing.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: BTreeMap<Field, f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: BTreeMap<Field, f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    pub fn coefficient(&self, field: Field) -> f64 {
        self.coefficients.get(&field).copied().unwrap_or(0.0)
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionServiceError> {
        let sum = features
            .iter()
            .fold(self.intercept, |acc, (field, x)| acc + self.coefficient(field) * x);
        Ok(sum)
    }

    fn describe(&self) -> String {
        format!(
            "linear model ({} coefficients, intercept {:.2})",
            self.coefficients.len(),
            self.intercept
        )
    }
}
