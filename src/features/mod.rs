pub mod bounds;
pub mod types;

pub use bounds::{field_bounds, FieldBounds, InputKind};
pub use types::{FeatureVector, Field, PredictionRecord, RawInput, RawValue};
