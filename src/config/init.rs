use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};
use crate::features::{Field, InputKind};
use crate::normalize::{FieldScaling, ScalingConfig};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Make a typed path independent of where the config ends up.
///
/// `load_config` resolves relative paths against the config file's
/// directory, so a relative answer is anchored at the directory the wizard
/// runs in. `~` paths are left for `load_config` to expand.
fn anchor_at(path: PathBuf, cwd: &Path) -> PathBuf {
    if path.starts_with("~") || path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Parse "center/spread" as typed in the wizard, e.g. "50/10".
fn parse_center_spread(s: &str) -> Result<FieldScaling, String> {
    let (center, spread) = s
        .split_once('/')
        .ok_or_else(|| "expected CENTER/SPREAD, e.g. 50/10".to_string())?;
    let center: f64 = center
        .trim()
        .parse()
        .map_err(|_| format!("center '{}' is not a number", center.trim()))?;
    let spread: f64 = spread
        .trim()
        .parse()
        .map_err(|_| format!("spread '{}' is not a number", spread.trim()))?;
    if !center.is_finite() || !spread.is_finite() || spread == 0.0 {
        return Err("center must be finite and spread finite and non-zero".to_string());
    }
    Ok(FieldScaling::new(center, spread))
}

fn prompt_clinical_scaling() -> Result<ScalingConfig> {
    let starter = ScalingConfig::clinical_starter();
    println!();
    println!("Clinical values are standardized as (value - center) / spread before reaching the model.");
    println!("The starter constants are approximations, not the training set's statistics.");
    println!("Lab fields s1..s6 have no real-unit conversion and pass through unchanged.");

    if prompt_yes_no("Use starter constants? (age 50/10, bmi 25/5, bp 120/15)", true)? {
        return Ok(starter);
    }

    let mut scaling = starter;
    for field in [Field::Age, Field::Bmi, Field::Bp] {
        let current = scaling.for_field(field);
        let default = format!("{}/{}", current.center, current.spread);
        let params = loop {
            let input = prompt_with_default(&format!("  {} center/spread", field), &default)?;
            match parse_center_spread(&input) {
                Ok(p) => break p,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };
        scaling.fields.insert(field, params);
    }
    scaling.approximate = prompt_yes_no(
        "Are these values approximations (not fitted to the training data)?",
        true,
    )?;
    Ok(scaling)
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    println!();
    println!("prog-predict configuration");
    println!("==========================");
    println!();

    // 1. Model
    let model = loop {
        let m = prompt("Path to the model file (JSON): ")?;
        if !m.is_empty() {
            break anchor_at(PathBuf::from(m), &cwd);
        }
        println!("  Model path is required.");
    };

    // 2. Input scale
    println!();
    println!("Inputs can be entered already standardized (as in the training data) or in clinical units.");
    let scaling = loop {
        let kind = prompt_with_default("Input scale (standardized/clinical)", InputKind::Standardized.label())?;
        match kind.to_lowercase().as_str() {
            "standardized" | "s" => break ScalingConfig::default(),
            "clinical" | "c" => break prompt_clinical_scaling()?,
            other => println!("  Invalid: '{}'. Try again.", other),
        }
    };

    // 3. Log file
    println!();
    let default_log = crate::history::get_log_path();
    let log_file = prompt_with_default("Where should saved predictions go?", &default_log.display().to_string())?;
    let log_file = anchor_at(PathBuf::from(log_file), &cwd);

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        model,
        log_file: if log_file == default_log { None } else { Some(log_file) },
        scaling,
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `prog-predict` to open the form, or `prog-predict predict --help` for one-off predictions.");

    Ok(())
}

/// Serialize the config and replace the file atomically.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}
