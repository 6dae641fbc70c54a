use serde::{Deserialize, Serialize};

use super::types::{Field, RawValue};

/// How the user enters values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Values already on the model's standardized scale (roughly -0.2..0.2).
    #[default]
    Standardized,
    /// Real-world units: age in years, bmi in kg/m2, bp in mmHg, sex as a label.
    Clinical,
}

impl InputKind {
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::Standardized => "standardized",
            InputKind::Clinical => "clinical",
        }
    }
}

/// Form range and step for one field. Only used to drive input widgets;
/// values outside the range are still accepted by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: RawValue,
    pub unit: &'static str,
}

impl FieldBounds {
    fn scaled(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: 0.001,
            default: RawValue::Number(0.0),
            unit: "scaled",
        }
    }

    fn real(min: f64, max: f64, step: f64, default: f64, unit: &'static str) -> Self {
        Self {
            min,
            max,
            step,
            default: RawValue::Number(default),
            unit,
        }
    }

    /// Step a numeric value up or down, staying inside the bounds.
    pub fn step_value(&self, value: f64, up: bool) -> f64 {
        let next = if up { value + self.step } else { value - self.step };
        // Round to the step grid so repeated stepping does not drift
        let snapped = (next / self.step).round() * self.step;
        snapped.clamp(self.min, self.max)
    }
}

/// Observed ranges of the standardized diabetes columns.
fn standardized_bounds(field: Field) -> FieldBounds {
    match field {
        Field::Age => FieldBounds::scaled(-0.11, 0.11),
        Field::Sex => FieldBounds::scaled(-0.045, 0.051),
        Field::Bmi => FieldBounds::scaled(-0.09, 0.17),
        Field::Bp => FieldBounds::scaled(-0.11, 0.13),
        Field::S1 => FieldBounds::scaled(-0.13, 0.15),
        Field::S2 => FieldBounds::scaled(-0.12, 0.20),
        Field::S3 => FieldBounds::scaled(-0.10, 0.18),
        Field::S4 => FieldBounds::scaled(-0.076, 0.185),
        Field::S5 => FieldBounds::scaled(-0.13, 0.134),
        Field::S6 => FieldBounds::scaled(-0.14, 0.136),
    }
}

pub fn field_bounds(field: Field, kind: InputKind) -> FieldBounds {
    match kind {
        InputKind::Standardized => standardized_bounds(field),
        InputKind::Clinical => match field {
            Field::Age => FieldBounds::real(20.0, 80.0, 1.0, 50.0, "years"),
            Field::Sex => FieldBounds {
                min: 0.0,
                max: 1.0,
                step: 1.0,
                default: RawValue::Label("Male".to_string()),
                unit: "Male/Female",
            },
            Field::Bmi => FieldBounds::real(15.0, 50.0, 0.1, 25.0, "kg/m2"),
            Field::Bp => FieldBounds::real(80.0, 200.0, 1.0, 120.0, "mmHg"),
            // Lab values have no real-unit conversion, so they keep the scaled ranges
            _ => standardized_bounds(field),
        },
    }
}
