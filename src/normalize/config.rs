use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::features::{Field, InputKind};

/// Scaling parameters for the normalizer.
///
/// Each listed field is transformed with `(raw - center) / spread`; fields
/// without an entry pass through unchanged. The constants are fixed at
/// startup and never fitted here.
///
/// Example YAML:
/// ```yaml
/// scaling:
///   input: clinical
///   approximate: true
///   fields:
///     age: { center: 50, spread: 10 }
///     bmi: { center: 25, spread: 5 }
///     bp: { center: 120, spread: 15 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScalingConfig {
    /// Scale the form collects values in (default: standardized)
    #[serde(default)]
    pub input: InputKind,

    /// Marks the constants as hand-picked approximations rather than
    /// statistics of the training data
    #[serde(default)]
    pub approximate: bool,

    /// Per-field affine parameters
    #[serde(default)]
    pub fields: BTreeMap<Field, FieldScaling>,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            input: InputKind::Standardized,
            approximate: false,
            fields: BTreeMap::new(),
        }
    }
}

impl ScalingConfig {
    /// Starter table for clinical-unit input.
    ///
    /// These are rough population figures, not the training set's means and
    /// standard deviations, and lab fields are left as identity. The table is
    /// flagged `approximate` so startup warns about it.
    pub fn clinical_starter() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(Field::Age, FieldScaling::new(50.0, 10.0));
        fields.insert(Field::Bmi, FieldScaling::new(25.0, 5.0));
        fields.insert(Field::Bp, FieldScaling::new(120.0, 15.0));
        Self {
            input: InputKind::Clinical,
            approximate: true,
            fields,
        }
    }

    /// Scaling for a field, identity when none is configured.
    pub fn for_field(&self, field: Field) -> FieldScaling {
        self.fields
            .get(&field)
            .copied()
            .unwrap_or_else(FieldScaling::identity)
    }

    /// Fields whose raw value reaches the model unchanged.
    pub fn identity_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.for_field(*f).is_identity())
            .collect()
    }

    /// Operator-facing warnings about the table. Empty when nothing is off.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.approximate {
            warnings.push(
                "Scaling constants are approximations, not fitted to the training data; predictions may be biased."
                    .to_string(),
            );
        }
        if self.input == InputKind::Clinical {
            let unscaled_labs: Vec<&str> = self
                .identity_fields()
                .into_iter()
                .filter(|f| f.is_lab())
                .map(|f| f.name())
                .collect();
            if !unscaled_labs.is_empty() {
                warnings.push(format!(
                    "Lab fields passed through unscaled: {}",
                    unscaled_labs.join(", ")
                ));
            }
        }
        warnings
    }
}

/// Affine parameters for one field.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldScaling {
    /// Subtracted from the raw value (default: 0)
    #[serde(default)]
    pub center: f64,

    /// Divides the centered value (default: 1)
    #[serde(default = "default_spread")]
    pub spread: f64,
}

fn default_spread() -> f64 {
    1.0
}

impl FieldScaling {
    pub fn new(center: f64, spread: f64) -> Self {
        Self { center, spread }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 1.0)
    }

    pub fn is_identity(&self) -> bool {
        self.center == 0.0 && self.spread == 1.0
    }

    pub fn apply(&self, raw: f64) -> f64 {
        (raw - self.center) / self.spread
    }
}
