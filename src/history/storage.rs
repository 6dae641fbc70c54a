use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::LogWriteError;
use crate::features::{Field, PredictionRecord};

/// Column header of the prediction log.
pub const LOG_HEADER: [&str; 11] = [
    "age",
    "sex",
    "bmi",
    "bp",
    "s1",
    "s2",
    "s3",
    "s4",
    "s5",
    "s6",
    "prediction",
];

/// One row of the prediction log. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedPrediction {
    pub age: f64,
    pub sex: f64,
    pub bmi: f64,
    pub bp: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
    pub s4: f64,
    pub s5: f64,
    pub s6: f64,
    pub prediction: f64,
}

impl From<&PredictionRecord> for LoggedPrediction {
    fn from(record: &PredictionRecord) -> Self {
        let f = &record.features;
        Self {
            age: f.get(Field::Age),
            sex: f.get(Field::Sex),
            bmi: f.get(Field::Bmi),
            bp: f.get(Field::Bp),
            s1: f.get(Field::S1),
            s2: f.get(Field::S2),
            s3: f.get(Field::S3),
            s4: f.get(Field::S4),
            s5: f.get(Field::S5),
            s6: f.get(Field::S6),
            prediction: record.prediction,
        }
    }
}

/// Get the default prediction log path (~/.config/prog-predict/predictions.csv)
pub fn get_log_path() -> PathBuf {
    crate::config::get_config_dir().join("predictions.csv")
}

fn needs_header(path: &Path) -> bool {
    // An empty file (e.g. created by `touch`) gets a header too
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
}

/// Serialize the row (and the header when required) into one buffer.
fn encode_row(row: &LoggedPrediction, with_header: bool) -> io::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer.serialize(row)?;
    writer.into_inner().map_err(|e| e.into_error())
}

/// Append a prediction to the log
///
/// Writes the header first when the file does not exist yet (or is empty).
/// The header and row go out in a single append so concurrent writers
/// cannot interleave partial lines.
pub fn append_record(path: &Path, record: &PredictionRecord) -> Result<(), LogWriteError> {
    let wrap = |source: io::Error| LogWriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
    }

    let buffer = encode_row(&LoggedPrediction::from(record), needs_header(path)).map_err(wrap)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)?;
    file.write_all(&buffer).map_err(wrap)?;

    Ok(())
}

/// Load every saved prediction
///
/// A missing log is an empty history. A log whose header is not the
/// expected one is an error rather than being read with shifted columns.
pub fn load_records(path: &Path) -> Result<Vec<LoggedPrediction>> {
    if needs_header(path) {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open prediction log at {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();
    if !headers.iter().eq(LOG_HEADER.iter().copied()) {
        anyhow::bail!(
            "Unexpected prediction log header in {}: {}",
            path.display(),
            headers.iter().collect::<Vec<_>>().join(",")
        );
    }

    let mut records = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        let row: LoggedPrediction =
            row.with_context(|| format!("Failed to parse row {} of {}", i + 1, path.display()))?;
        records.push(row);
    }
    Ok(records)
}
