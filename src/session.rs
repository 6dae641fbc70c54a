//! The normalize -> predict -> save pipeline with its state held explicitly.

use chrono::Utc;
use std::path::Path;

use crate::error::{LogWriteError, SessionError};
use crate::features::{PredictionRecord, RawInput};
use crate::model::{predict_checked, Predictor};
use crate::normalize::{clamp_prediction, normalize, NormalizeResult, ScalingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    NothingToSave,
}

/// What one user sees between actions: the most recent prediction, if any.
#[derive(Debug, Clone, Default)]
pub struct PredictionSession {
    last: Option<PredictionRecord>,
    last_breakdown: Option<NormalizeResult>,
}

impl PredictionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&PredictionRecord> {
        self.last.as_ref()
    }

    /// Per-field normalization of the last successful prediction.
    pub fn last_breakdown(&self) -> Option<&NormalizeResult> {
        self.last_breakdown.as_ref()
    }

    /// Normalize the input, call the model and keep the clamped result.
    ///
    /// On failure the previous prediction is kept as it was.
    pub fn predict(
        &mut self,
        input: &RawInput,
        scaling: &ScalingConfig,
        predictor: &dyn Predictor,
    ) -> Result<&PredictionRecord, SessionError> {
        let normalized = normalize(input, scaling)?;
        let raw_prediction = predict_checked(predictor, &normalized.vector)?;

        let record = PredictionRecord {
            features: normalized.vector,
            raw_prediction,
            prediction: clamp_prediction(raw_prediction),
            predicted_at: Utc::now(),
        };
        self.last_breakdown = Some(normalized);

        Ok(&*self.last.insert(record))
    }

    /// Append the last prediction to the log. A no-op before any prediction.
    pub fn save(&self, log_path: &Path) -> Result<SaveOutcome, LogWriteError> {
        match &self.last {
            Some(record) => {
                crate::history::append_record(log_path, record)?;
                Ok(SaveOutcome::Saved)
            }
            None => Ok(SaveOutcome::NothingToSave),
        }
    }

    /// Forget the last prediction, e.g. after the inputs changed.
    pub fn clear(&mut self) {
        self.last = None;
        self.last_breakdown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NormalizeError, PredictionServiceError};
    use crate::features::{FeatureVector, Field};
    use std::env;
    use std::fs;

    /// Returns a fixed value regardless of input.
    struct Fixed(f64);

    impl Predictor for Fixed {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, PredictionServiceError> {
            Ok(self.0)
        }

        fn describe(&self) -> String {
            format!("fixed {}", self.0)
        }
    }

    struct Failing;

    impl Predictor for Failing {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, PredictionServiceError> {
            Err(PredictionServiceError::new("model not loaded"))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn complete_input() -> RawInput {
        let mut input = RawInput::new()
            .with(Field::Age, 50.0)
            .with(Field::Sex, "Male")
            .with(Field::Bmi, 25.0)
            .with(Field::Bp, 120.0);
        for field in Field::ALL.iter().filter(|f| f.is_lab()) {
            input.set(*field, 0.0);
        }
        input
    }

    #[test]
    fn test_predict_clamps_negative() {
        let mut session = PredictionSession::new();
        let record = session
            .predict(&complete_input(), &ScalingConfig::clinical_starter(), &Fixed(-3.2))
            .unwrap();
        assert_eq!(record.prediction, 0.0);
        assert_eq!(record.raw_prediction, -3.2);
        assert!(record.was_clamped());
    }

    #[test]
    fn test_predict_keeps_positive() {
        let mut session = PredictionSession::new();
        let record = session
            .predict(&complete_input(), &ScalingConfig::clinical_starter(), &Fixed(47.8))
            .unwrap();
        assert_eq!(record.prediction, 47.8);
        assert_eq!(
            record.features.values(),
            &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert!(session.last_breakdown().is_some());
    }

    #[test]
    fn test_failed_predict_keeps_previous() {
        let mut session = PredictionSession::new();
        let scaling = ScalingConfig::clinical_starter();
        session.predict(&complete_input(), &scaling, &Fixed(10.0)).unwrap();

        let err = session
            .predict(&complete_input(), &scaling, &Failing)
            .unwrap_err();
        assert!(matches!(err, SessionError::Prediction(_)));
        assert_eq!(session.last().unwrap().prediction, 10.0);
    }

    #[test]
    fn test_missing_field_aborts_predict() {
        let mut session = PredictionSession::new();
        let mut input = complete_input();
        input.remove(Field::Bmi);
        let err = session
            .predict(&input, &ScalingConfig::clinical_starter(), &Fixed(1.0))
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Normalize(NormalizeError::MissingField { field: Field::Bmi })
        );
        assert!(session.last().is_none());
    }

    #[test]
    fn test_save_without_prediction_is_noop() {
        let path = env::temp_dir().join("prog_predict_test_session_noop.csv");
        let _ = fs::remove_file(&path);

        let session = PredictionSession::new();
        assert_eq!(session.save(&path).unwrap(), SaveOutcome::NothingToSave);
        assert!(!path.exists());
    }

    #[test]
    fn test_save_appends_last_prediction() {
        let path = env::temp_dir().join("prog_predict_test_session_save.csv");
        let _ = fs::remove_file(&path);

        let mut session = PredictionSession::new();
        let scaling = ScalingConfig::clinical_starter();
        session.predict(&complete_input(), &scaling, &Fixed(47.8)).unwrap();
        assert_eq!(session.save(&path).unwrap(), SaveOutcome::Saved);
        session.predict(&complete_input(), &scaling, &Fixed(-1.0)).unwrap();
        assert_eq!(session.save(&path).unwrap(), SaveOutcome::Saved);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",47.8"));
        assert!(lines[2].ends_with(",0.0"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_failed_save_keeps_prediction() {
        // A regular file where the log's parent directory should be
        let blocker = env::temp_dir().join("prog_predict_test_session_blocker");
        let _ = fs::remove_dir_all(&blocker);
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("predictions.csv");

        let mut session = PredictionSession::new();
        session
            .predict(&complete_input(), &ScalingConfig::clinical_starter(), &Fixed(47.8))
            .unwrap();

        let err = session.save(&path).unwrap_err();
        assert_eq!(err.path, path);
        assert_eq!(session.last().unwrap().prediction, 47.8);

        let _ = fs::remove_file(&blocker);
    }

    #[test]
    fn test_non_finite_input_aborts_predict() {
        let mut session = PredictionSession::new();
        let input = complete_input().with(Field::Bmi, f64::NAN);
        let err = session
            .predict(&input, &ScalingConfig::clinical_starter(), &Fixed(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Normalize(NormalizeError::NonFinite { field: Field::Bmi, .. })
        ));
        assert!(session.last().is_none());
    }

    #[test]
    fn test_clear() {
        let mut session = PredictionSession::new();
        session
            .predict(&complete_input(), &ScalingConfig::clinical_starter(), &Fixed(5.0))
            .unwrap();
        session.clear();
        assert!(session.last().is_none());
        assert!(session.last_breakdown().is_none());
    }
}
