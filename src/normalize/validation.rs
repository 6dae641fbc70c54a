use super::config::ScalingConfig;

/// Validate scaling configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scaling(config: &ScalingConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (field, scaling) in &config.fields {
        if !scaling.center.is_finite() {
            errors.push(format!(
                "scaling.fields.{}.center: must be a finite number, got {}",
                field, scaling.center
            ));
        }

        if !scaling.spread.is_finite() {
            errors.push(format!(
                "scaling.fields.{}.spread: must be a finite number, got {}",
                field, scaling.spread
            ));
        } else if scaling.spread == 0.0 {
            errors.push(format!("scaling.fields.{}.spread: must be non-zero", field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Field;
    use crate::normalize::FieldScaling;

    #[test]
    fn test_valid_config() {
        assert!(validate_scaling(&ScalingConfig::clinical_starter()).is_ok());
    }

    #[test]
    fn test_empty_config() {
        assert!(validate_scaling(&ScalingConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_spread() {
        let mut config = ScalingConfig::default();
        config.fields.insert(Field::Bmi, FieldScaling::new(25.0, 0.0));
        let errors = validate_scaling(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scaling.fields.bmi.spread"));
        assert!(errors[0].contains("non-zero"));
    }

    #[test]
    fn test_non_finite_center() {
        let mut config = ScalingConfig::default();
        config.fields.insert(Field::Age, FieldScaling::new(f64::NAN, 10.0));
        let errors = validate_scaling(&config).unwrap_err();
        assert!(errors[0].contains("scaling.fields.age.center"));
    }

    #[test]
    fn test_negative_spread_allowed() {
        // A negative spread flips the axis; odd but well-defined
        let mut config = ScalingConfig::default();
        config.fields.insert(Field::Bp, FieldScaling::new(0.0, -2.0));
        assert!(validate_scaling(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ScalingConfig::default();
        config.fields.insert(Field::Age, FieldScaling::new(f64::INFINITY, 0.0)); // Errors 1, 2
        config.fields.insert(Field::Bp, FieldScaling::new(85.0, f64::NAN)); // Error 3
        let errors = validate_scaling(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
