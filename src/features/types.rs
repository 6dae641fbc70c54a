use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the ten model columns.
///
/// Variant order is the column order the model was trained on, and `Ord`
/// follows it, so a `BTreeMap<Field, _>` iterates in column order too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Age,
    Sex,
    Bmi,
    Bp,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
}

impl Field {
    pub const COUNT: usize = 10;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Age,
        Field::Sex,
        Field::Bmi,
        Field::Bp,
        Field::S1,
        Field::S2,
        Field::S3,
        Field::S4,
        Field::S5,
        Field::S6,
    ];

    /// Column name as written in the log header and model files.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Sex => "sex",
            Field::Bmi => "bmi",
            Field::Bp => "bp",
            Field::S1 => "s1",
            Field::S2 => "s2",
            Field::S3 => "s3",
            Field::S4 => "s4",
            Field::S5 => "s5",
            Field::S6 => "s6",
        }
    }

    /// Position in the feature vector.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_lab(&self) -> bool {
        matches!(
            self,
            Field::S1 | Field::S2 | Field::S3 | Field::S4 | Field::S5 | Field::S6
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown field '{}'", s))
    }
}

/// A value as the user supplied it, before encoding or scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Label(String),
}

impl RawValue {
    /// Parse command-line or form text: anything that reads as a float is a
    /// number, everything else is kept as a label.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<f64>() {
            Ok(n) => RawValue::Number(n),
            Err(_) => RawValue::Label(s.to_string()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Label(l) => f.write_str(l),
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Label(s.to_string())
    }
}

/// User input keyed by field. May be incomplete; the normalizer decides
/// whether it is usable.
///
/// Example YAML:
/// ```yaml
/// age: 50
/// sex: Male
/// bmi: 25.0
/// bp: 120
/// s1: 0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    values: BTreeMap<Field, RawValue>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Field, V)>,
        V: Into<RawValue>,
    {
        let mut input = Self::new();
        for (field, value) in pairs {
            input.set(field, value);
        }
        input
    }

    pub fn set(&mut self, field: Field, value: impl Into<RawValue>) {
        self.values.insert(field, value.into());
    }

    pub fn with(mut self, field: Field, value: impl Into<RawValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn remove(&mut self, field: Field) -> Option<RawValue> {
        self.values.remove(&field)
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.values.get(&field)
    }

    /// Overlay every value from `other` on top of this input.
    pub fn merge(&mut self, other: RawInput) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fields that still need a value, in column order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| !self.values.contains_key(f))
            .collect()
    }
}

/// The ten model inputs in column order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; Field::COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; Field::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, field: Field) -> f64 {
        self.0[field.index()]
    }

    pub fn values(&self) -> &[f64; Field::COUNT] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.iter().map(move |f| (*f, self.0[f.index()]))
    }
}

/// A completed prediction: what went into the model and what came out.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub features: FeatureVector,
    /// Model output before the non-negative floor.
    pub raw_prediction: f64,
    /// Value shown to the user and written to the log.
    pub prediction: f64,
    pub predicted_at: DateTime<Utc>,
}

impl PredictionRecord {
    /// Whether the floor changed the model output.
    pub fn was_clamped(&self) -> bool {
        self.raw_prediction < 0.0
    }
}
