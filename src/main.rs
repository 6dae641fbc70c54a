use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use prog_predict::buffered_eprintln;
use prog_predict::config::ResolvedConfig;
use prog_predict::error::SessionError;
use prog_predict::features::{Field, RawInput, RawValue};
use prog_predict::model::Predictor;
use prog_predict::session::{PredictionSession, SaveOutcome};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_PREDICTION: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive form (default if no subcommand)
    Form,
    /// Predict once from command-line values and/or an input file
    Predict(PredictArgs),
    /// List saved predictions
    History {
        /// Tab-separated output without header, for scripts
        #[arg(long)]
        tsv: bool,
    },
    /// Validate config and model, and show the scaling table
    Check,
    /// Create a config file interactively
    Init,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// YAML or JSON file with field values; flags override it
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(long, allow_hyphen_values = true)]
    age: Option<String>,
    /// "Male", "Female", or an already standardized number
    #[arg(long, allow_hyphen_values = true)]
    sex: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    bmi: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    bp: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    s1: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    s2: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    s3: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    s4: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    s5: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    s6: Option<String>,

    /// Append the result to the prediction log
    #[arg(long)]
    save: bool,

    /// Show how each field was normalized
    #[arg(short, long)]
    breakdown: bool,
}

impl PredictArgs {
    fn flag_values(&self) -> [(Field, &Option<String>); Field::COUNT] {
        [
            (Field::Age, &self.age),
            (Field::Sex, &self.sex),
            (Field::Bmi, &self.bmi),
            (Field::Bp, &self.bp),
            (Field::S1, &self.s1),
            (Field::S2, &self.s2),
            (Field::S3, &self.s3),
            (Field::S4, &self.s4),
            (Field::S5, &self.s5),
            (Field::S6, &self.s6),
        ]
    }

    /// Input file first, then flags on top.
    fn raw_input(&self) -> Result<RawInput> {
        let mut input = match &self.input {
            Some(path) => read_input_file(path)?,
            None => RawInput::new(),
        };
        for (field, value) in self.flag_values() {
            if let Some(text) = value {
                input.set(field, RawValue::parse(text));
            }
        }
        Ok(input)
    }
}

fn read_input_file(path: &Path) -> Result<RawInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file at {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let input = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse input: invalid JSON in {}", path.display()))?
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse input: invalid YAML in {}", path.display()))?
    };
    Ok(input)
}

#[derive(Parser, Debug)]
#[command(name = "prog-predict")]
#[command(about = "Diabetes progression prediction from clinical features", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/prog-predict/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Load config and model, validate the scaling table, and report warnings.
/// Exits the process on any problem.
fn load_runtime(config_path: Option<PathBuf>, verbose: bool) -> (ResolvedConfig, Box<dyn Predictor>) {
    let resolved = match prog_predict::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if verbose {
        eprintln!("Loaded config from {}", resolved.path.display());
        eprintln!("  Model: {}", resolved.model_path.display());
        eprintln!("  Log: {}", resolved.log_path.display());
        eprintln!("  Input scale: {}", resolved.config.scaling.input.label());
    }

    // Validate scaling config at startup
    if let Err(errors) = prog_predict::normalize::validate_scaling(&resolved.config.scaling) {
        eprintln!("Scaling config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    for warning in resolved.config.scaling.warnings() {
        buffered_eprintln!("Warning: {}", warning);
    }

    let predictor = match prog_predict::model::load_model(&resolved.model_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Model error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if verbose {
        eprintln!("Loaded {}", predictor.describe());
    }

    (resolved, predictor)
}

fn run_predict(args: &PredictArgs, resolved: &ResolvedConfig, predictor: &dyn Predictor, verbose: bool) -> i32 {
    let input = match args.raw_input() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_INPUT;
        }
    };

    if verbose {
        eprintln!("Read {} of {} fields", input.len(), Field::COUNT);
    }

    let start = Instant::now();
    let mut session = PredictionSession::new();
    let use_colors = prog_predict::output::should_use_colors();

    let line = match session.predict(&input, &resolved.config.scaling, predictor) {
        Ok(record) => prog_predict::output::format_prediction_line(record, use_colors),
        Err(SessionError::Normalize(e)) => {
            eprintln!("Input error: {}", e);
            return EXIT_INPUT;
        }
        Err(SessionError::Prediction(e)) => {
            eprintln!("Error: {}", e);
            return EXIT_PREDICTION;
        }
    };
    println!("{}", line);

    if args.breakdown || verbose {
        if let Some(result) = session.last_breakdown() {
            println!("{}", prog_predict::output::format_breakdown(result, use_colors));
        }
    }

    if verbose {
        eprintln!("Predicted in {:?}", start.elapsed());
    }

    if args.save {
        // A failed save is a warning: the prediction above still stands
        match session.save(&resolved.log_path) {
            Ok(SaveOutcome::Saved) => println!("Prediction saved to {}", resolved.log_path.display()),
            Ok(SaveOutcome::NothingToSave) => {}
            Err(e) => buffered_eprintln!("Warning: {}", e),
        }
    }

    EXIT_SUCCESS
}

fn run_history(resolved: &ResolvedConfig, tsv: bool) -> i32 {
    let rows = match prog_predict::history::load_records(&resolved.log_path) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("History error: {:#}", e);
            return EXIT_CONFIG;
        }
    };

    if tsv {
        if !rows.is_empty() {
            println!("{}", prog_predict::output::format_tsv(&rows));
        }
    } else {
        let use_colors = prog_predict::output::should_use_colors();
        println!("{}", prog_predict::output::format_history_table(&rows, use_colors));
    }
    EXIT_SUCCESS
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Form);
    let config_path = cli.config.map(PathBuf::from);

    let code = match command {
        Commands::Init => match prog_predict::config::init::run_init_wizard(config_path) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                eprintln!("Init failed: {:#}", e);
                EXIT_CONFIG
            }
        },
        Commands::History { tsv } => {
            // History only needs the log location, not a working model
            match prog_predict::config::load_config(config_path) {
                Ok(resolved) => run_history(&resolved, tsv),
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    EXIT_CONFIG
                }
            }
        }
        Commands::Check => {
            let (resolved, predictor) = load_runtime(config_path, cli.verbose);
            let use_colors = prog_predict::output::should_use_colors();
            println!("Config: {}", resolved.path.display());
            println!("Model: {} ({})", resolved.model_path.display(), predictor.describe());
            println!("Log: {}", resolved.log_path.display());
            println!(
                "{}",
                prog_predict::output::format_scaling_table(&resolved.config.scaling, use_colors)
            );
            EXIT_SUCCESS
        }
        Commands::Predict(args) => {
            let (resolved, predictor) = load_runtime(config_path, cli.verbose);
            run_predict(&args, &resolved, predictor.as_ref(), cli.verbose)
        }
        Commands::Form => {
            let (resolved, predictor) = load_runtime(config_path, cli.verbose);
            let theme = prog_predict::tui::resolve_theme().colors();
            let app = prog_predict::tui::App::new(
                resolved.config.scaling.clone(),
                predictor,
                resolved.log_path.clone(),
                theme,
            );
            match prog_predict::tui::run_tui(app).await {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    eprintln!("TUI error: {:#}", e);
                    EXIT_CONFIG
                }
            }
        }
    };

    std::process::exit(code);
}
