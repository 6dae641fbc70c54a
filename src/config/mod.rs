pub mod init;
mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/prog-predict/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("prog-predict")
}

/// Get the default config file path (~/.config/prog-predict/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory at {}", config_dir.display()))?;
    }
    Ok(())
}

/// Expand a leading `~` and anchor relative paths at `base`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

/// A loaded config with every path made absolute.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: Config,
    pub path: PathBuf,
    pub model_path: PathBuf,
    pub log_path: PathBuf,
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/prog-predict/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<ResolvedConfig> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `prog-predict init` to create one",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    let base = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let model_path = resolve_path(&config.model, &base);
    let log_path = match &config.log_file {
        Some(p) => resolve_path(p, &base),
        None => crate::history::get_log_path(),
    };

    Ok(ResolvedConfig {
        config,
        path: config_path,
        model_path,
        log_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::InputKind;
    use std::env;

    #[test]
    fn test_resolve_relative_against_base() {
        let resolved = resolve_path(Path::new("model.json"), Path::new("/etc/prog"));
        assert_eq!(resolved, PathBuf::from("/etc/prog/model.json"));
    }

    #[test]
    fn test_resolve_absolute_unchanged() {
        let resolved = resolve_path(Path::new("/srv/model.json"), Path::new("/etc/prog"));
        assert_eq!(resolved, PathBuf::from("/srv/model.json"));
    }

    #[test]
    fn test_resolve_tilde() {
        let resolved = resolve_path(Path::new("~/models/m.json"), Path::new("/etc/prog"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolved, home.join("models/m.json"));
        }
    }

    #[test]
    fn test_load_config_resolves_paths() {
        let dir = env::temp_dir().join("prog_predict_test_config");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        fs::write(
            &path,
            r#"
model: model.json
log_file: logs/predictions.csv
scaling:
  input: clinical
  approximate: true
  fields:
    age: { center: 50, spread: 10 }
"#,
        )
        .unwrap();

        let resolved = load_config(Some(path.clone())).unwrap();
        assert_eq!(resolved.model_path, dir.join("model.json"));
        assert_eq!(resolved.log_path, dir.join("logs/predictions.csv"));
        assert_eq!(resolved.config.scaling.input, InputKind::Clinical);
        assert!(resolved.config.scaling.approximate);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_config_defaults() {
        let path = env::temp_dir().join("prog_predict_test_config_min.yaml");
        fs::write(&path, "model: /srv/model.json\n").unwrap();

        let resolved = load_config(Some(path.clone())).unwrap();
        assert_eq!(resolved.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(resolved.log_path, crate::history::get_log_path());
        assert_eq!(resolved.config.scaling.input, InputKind::Standardized);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_demo_configs_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

        let standardized = load_config(Some(dir.join("config.yaml"))).unwrap();
        assert_eq!(standardized.config.scaling.input, InputKind::Standardized);
        assert_eq!(standardized.model_path, dir.join("linear_model.json"));

        let clinical = load_config(Some(dir.join("config-clinical.yaml"))).unwrap();
        assert_eq!(clinical.config.scaling, crate::normalize::ScalingConfig::clinical_starter());
    }

    #[test]
    fn test_load_config_missing() {
        let path = env::temp_dir().join("prog_predict_test_config_absent.yaml");
        let _ = fs::remove_file(&path);
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("prog-predict init"));
    }

    #[test]
    fn test_load_config_rejects_unknown_keys() {
        let path = env::temp_dir().join("prog_predict_test_config_unknown.yaml");
        fs::write(&path, "model: m.json\nqueries: []\n").unwrap();
        assert!(load_config(Some(path.clone())).is_err());
        let _ = fs::remove_file(&path);
    }
}
