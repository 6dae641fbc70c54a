use super::config::ScalingConfig;
use crate::error::NormalizeError;
use crate::features::{FeatureVector, Field, RawInput, RawValue};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldStep {
    pub field: Field,
    /// Value as entered, e.g. "Male" or "135"
    pub raw: String,
    /// Applied mapping, e.g. "Male -> 1", "(x - 120) / 15" or "identity"
    pub transform: String,
    /// Value handed to the model
    pub scaled: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeResult {
    pub vector: FeatureVector,
    pub steps: Vec<FieldStep>,
}

/// Binary encoding for the categorical `sex` column.
pub fn encode_sex(label: &str) -> Option<f64> {
    let label = label.trim();
    if label.eq_ignore_ascii_case("male") {
        Some(1.0)
    } else if label.eq_ignore_ascii_case("female") {
        Some(0.0)
    } else {
        None
    }
}

/// Map user input onto the model's feature vector.
///
/// Fields are processed in column order and the first absent one is
/// reported. NaN and infinities are rejected; otherwise no range checks
/// are made.
pub fn normalize(input: &RawInput, scaling: &ScalingConfig) -> Result<NormalizeResult, NormalizeError> {
    let mut values = [0.0; Field::COUNT];
    let mut steps = Vec::with_capacity(Field::COUNT);

    for field in Field::ALL {
        let raw = input
            .get(field)
            .ok_or(NormalizeError::MissingField { field })?;

        let (scaled, transform) = match raw {
            RawValue::Label(label) if field == Field::Sex => {
                let encoded = encode_sex(label).ok_or_else(|| NormalizeError::UnknownCategory {
                    field,
                    value: label.clone(),
                })?;
                (encoded, format!("{} -> {}", label.trim(), encoded))
            }
            RawValue::Label(label) => {
                return Err(NormalizeError::UnexpectedLabel {
                    field,
                    value: label.clone(),
                })
            }
            RawValue::Number(n) if !n.is_finite() => {
                return Err(NormalizeError::NonFinite { field, value: *n })
            }
            RawValue::Number(n) => {
                let params = scaling.for_field(field);
                let description = if params.is_identity() {
                    "identity".to_string()
                } else {
                    format!("(x - {}) / {}", params.center, params.spread)
                };
                (params.apply(*n), description)
            }
        };

        values[field.index()] = scaled;
        steps.push(FieldStep {
            field,
            raw: raw.to_string(),
            transform,
            scaled,
        });
    }

    Ok(NormalizeResult {
        vector: FeatureVector::new(values),
        steps,
    })
}

/// Non-negative floor applied to model output before display and logging.
pub fn clamp_prediction(raw: f64) -> f64 {
    // Comparison form keeps -0.0 from surviving and printing as "-0.00"
    if raw > 0.0 {
        raw
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FieldScaling;

    fn zero_labs(input: RawInput) -> RawInput {
        let mut input = input;
        for field in Field::ALL.iter().filter(|f| f.is_lab()) {
            input.set(*field, 0.0);
        }
        input
    }

    fn clinical_input(sex: &str) -> RawInput {
        zero_labs(
            RawInput::new()
                .with(Field::Age, 50.0)
                .with(Field::Sex, sex)
                .with(Field::Bmi, 25.0)
                .with(Field::Bp, 120.0),
        )
    }

    fn standardized_input() -> RawInput {
        RawInput::from_pairs([
            (Field::Age, 0.038),
            (Field::Sex, 0.05),
            (Field::Bmi, 0.061),
            (Field::Bp, 0.021),
            (Field::S1, -0.044),
            (Field::S2, -0.034),
            (Field::S3, -0.043),
            (Field::S4, -0.002),
            (Field::S5, 0.019),
            (Field::S6, -0.017),
        ])
    }

    #[test]
    fn test_reference_scenario() {
        let result = normalize(&clinical_input("Male"), &ScalingConfig::clinical_starter()).unwrap();
        assert_eq!(
            result.vector.values(),
            &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_output_length_and_order() {
        let result = normalize(&standardized_input(), &ScalingConfig::default()).unwrap();
        assert_eq!(result.vector.len(), 10);
        assert_eq!(result.steps.len(), 10);
        for (i, step) in result.steps.iter().enumerate() {
            assert_eq!(step.field, Field::ALL[i]);
        }
        assert_eq!(result.vector.get(Field::Bmi), 0.061);
        assert_eq!(result.vector.get(Field::S6), -0.017);
    }

    #[test]
    fn test_sex_encoding() {
        let scaling = ScalingConfig::clinical_starter();
        let male = normalize(&clinical_input("Male"), &scaling).unwrap();
        let female = normalize(&clinical_input("Female"), &scaling).unwrap();
        assert_eq!(male.vector.get(Field::Sex), 1.0);
        assert_eq!(female.vector.get(Field::Sex), 0.0);
    }

    #[test]
    fn test_sex_encoding_ignores_case() {
        assert_eq!(encode_sex("MALE"), Some(1.0));
        assert_eq!(encode_sex(" female "), Some(0.0));
        assert_eq!(encode_sex("other"), None);
    }

    #[test]
    fn test_sex_label_not_scaled() {
        let mut scaling = ScalingConfig::clinical_starter();
        scaling.fields.insert(Field::Sex, FieldScaling::new(0.5, 0.5));
        let result = normalize(&clinical_input("Male"), &scaling).unwrap();
        assert_eq!(result.vector.get(Field::Sex), 1.0);
    }

    #[test]
    fn test_numeric_sex_passes_through() {
        let result = normalize(&standardized_input(), &ScalingConfig::default()).unwrap();
        assert_eq!(result.vector.get(Field::Sex), 0.05);
    }

    #[test]
    fn test_idempotent() {
        let input = clinical_input("Female").with(Field::Age, 63.0).with(Field::Bp, 97.5);
        let scaling = ScalingConfig::clinical_starter();
        let first = normalize(&input, &scaling).unwrap();
        let second = normalize(&input, &scaling).unwrap();
        for (a, b) in first.vector.values().iter().zip(second.vector.values()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_affine_transform() {
        let input = clinical_input("Male")
            .with(Field::Age, 70.0)
            .with(Field::Bmi, 30.0)
            .with(Field::Bp, 90.0);
        let result = normalize(&input, &ScalingConfig::clinical_starter()).unwrap();
        assert_eq!(result.vector.get(Field::Age), 2.0);
        assert_eq!(result.vector.get(Field::Bmi), 1.0);
        assert_eq!(result.vector.get(Field::Bp), -2.0);
    }

    #[test]
    fn test_out_of_range_accepted() {
        let input = clinical_input("Male").with(Field::Age, 140.0);
        let result = normalize(&input, &ScalingConfig::clinical_starter()).unwrap();
        assert_eq!(result.vector.get(Field::Age), 9.0);
    }

    #[test]
    fn test_missing_bmi() {
        let mut input = clinical_input("Male");
        input.remove(Field::Bmi);
        let err = normalize(&input, &ScalingConfig::clinical_starter()).unwrap_err();
        assert_eq!(err, NormalizeError::MissingField { field: Field::Bmi });
        assert!(err.to_string().contains("bmi"));
    }

    #[test]
    fn test_first_missing_field_reported() {
        let input = RawInput::new().with(Field::Age, 50.0);
        let err = normalize(&input, &ScalingConfig::default()).unwrap_err();
        assert_eq!(err, NormalizeError::MissingField { field: Field::Sex });
    }

    #[test]
    fn test_unknown_sex_label() {
        let err = normalize(&clinical_input("unknown"), &ScalingConfig::clinical_starter()).unwrap_err();
        assert!(matches!(err, NormalizeError::UnknownCategory { field: Field::Sex, .. }));
    }

    #[test]
    fn test_label_on_numeric_field() {
        let input = clinical_input("Male").with(Field::Bp, "high");
        let err = normalize(&input, &ScalingConfig::clinical_starter()).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::UnexpectedLabel {
                field: Field::Bp,
                value: "high".to_string()
            }
        );
    }

    #[test]
    fn test_non_finite_number_rejected() {
        let scaling = ScalingConfig::clinical_starter();
        for text in ["nan", "inf", "-inf"] {
            let input = clinical_input("Male").with(Field::Bmi, RawValue::parse(text));
            let err = normalize(&input, &scaling).unwrap_err();
            assert!(
                matches!(err, NormalizeError::NonFinite { field: Field::Bmi, .. }),
                "{} gave {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_non_finite_from_yaml_rejected() {
        let mut input = clinical_input("Male");
        let overlay: RawInput = serde_saphyr::from_str("bp: .nan\n").unwrap();
        input.merge(overlay);
        // Whether the YAML reader yields NaN or the literal text, no vector comes out
        assert!(normalize(&input, &ScalingConfig::clinical_starter()).is_err());
    }

    #[test]
    fn test_step_descriptions() {
        let result = normalize(&clinical_input("Male"), &ScalingConfig::clinical_starter()).unwrap();
        assert_eq!(result.steps[0].transform, "(x - 50) / 10");
        assert_eq!(result.steps[1].transform, "Male -> 1");
        assert_eq!(result.steps[4].transform, "identity");
    }

    #[test]
    fn test_clamp_law() {
        assert_eq!(clamp_prediction(-3.2), 0.0);
        assert_eq!(clamp_prediction(47.8), 47.8);
        assert_eq!(clamp_prediction(0.0), 0.0);
        assert!(clamp_prediction(-0.0).is_sign_positive());
    }
}
