pub mod config;
pub mod engine;
pub mod validation;

pub use config::*;
pub use engine::{clamp_prediction, encode_sex, normalize, FieldStep, NormalizeResult};
pub use validation::validate_scaling;
