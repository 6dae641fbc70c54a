use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::normalize::ScalingConfig;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the JSON model file
    pub model: PathBuf,

    /// Where saved predictions are appended (default: predictions.csv in the config dir)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub scaling: ScalingConfig,
}
