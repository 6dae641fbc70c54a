use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::features::{Field, PredictionRecord};
use crate::history::{LoggedPrediction, LOG_HEADER};
use crate::normalize::{NormalizeResult, ScalingConfig};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Two-decimal display form of a prediction, e.g. "47.80".
pub fn format_prediction(value: f64) -> String {
    format!("{:.2}", value)
}

/// Headline result line, noting when the model output was floored.
pub fn format_prediction_line(record: &PredictionRecord, use_colors: bool) -> String {
    let value = format_prediction(record.prediction);
    let mut line = if use_colors {
        format!("Predicted diabetes progression: {}", value.green().bold())
    } else {
        format!("Predicted diabetes progression: {}", value)
    };
    if record.was_clamped() {
        let note = format!(
            " (model returned {}, floored at 0)",
            format_prediction(record.raw_prediction)
        );
        if use_colors {
            line.push_str(&note.dimmed().to_string());
        } else {
            line.push_str(&note);
        }
    }
    line
}

/// One line per field: raw input, transform, value sent to the model.
pub fn format_breakdown(result: &NormalizeResult, use_colors: bool) -> String {
    result
        .steps
        .iter()
        .map(|step| {
            let field = format!("{:<4}", step.field.name());
            let raw = format!("{:>10}", step.raw);
            let transform = format!("{:<22}", step.transform);
            let scaled = format!("{:>10.4}", step.scaled);
            if use_colors {
                format!("  {} {}  {}  {}", field.cyan(), raw, transform.dimmed(), scaled.bold())
            } else {
                format!("  {} {}  {}  {}", field, raw, transform, scaled)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Describe the scaling table, listing identity fields together.
pub fn format_scaling_table(scaling: &ScalingConfig, use_colors: bool) -> String {
    let mut lines = vec![format!("Input scale: {}", scaling.input.label())];

    for field in Field::ALL {
        let params = scaling.for_field(field);
        if params.is_identity() {
            continue;
        }
        let name = format!("{:<4}", field.name());
        let detail = format!("center {:>8}  spread {:>8}", params.center, params.spread);
        if use_colors {
            lines.push(format!("  {} {}", name.cyan(), detail));
        } else {
            lines.push(format!("  {} {}", name, detail));
        }
    }

    let identity: Vec<&str> = scaling.identity_fields().iter().map(|f| f.name()).collect();
    if !identity.is_empty() {
        lines.push(format!("  identity: {}", identity.join(", ")));
    }

    if scaling.approximate {
        let note = "Constants are marked approximate (not fitted to training data).";
        if use_colors {
            lines.push(note.yellow().to_string());
        } else {
            lines.push(note.to_string());
        }
    }

    lines.join("\n")
}

fn logged_values(row: &LoggedPrediction) -> [f64; 11] {
    [
        row.age,
        row.sex,
        row.bmi,
        row.bp,
        row.s1,
        row.s2,
        row.s3,
        row.s4,
        row.s5,
        row.s6,
        row.prediction,
    ]
}

/// Format saved predictions as a table with a 1-based index column.
/// Narrow terminals get the prediction and the four demographic columns only.
pub fn format_history_table(rows: &[LoggedPrediction], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No saved predictions.".to_string();
    }

    let column_width = 9;
    let index_width = 4;
    let full_width = index_width + LOG_HEADER.len() * (column_width + 1);
    let compact = matches!(get_terminal_width(), Some(w) if w < full_width);

    // Column positions into LOG_HEADER / logged_values
    let columns: Vec<usize> = if compact {
        vec![0, 1, 2, 3, 10]
    } else {
        (0..LOG_HEADER.len()).collect()
    };

    let header = std::iter::once(format!("{:>width$}", "#", width = index_width))
        .chain(
            columns
                .iter()
                .map(|&c| format!("{:>width$}", LOG_HEADER[c], width = column_width)),
        )
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for (idx, row) in rows.iter().enumerate() {
        let values = logged_values(row);
        let index_str = format!("{:>width$}", format!("{}.", idx + 1), width = index_width);
        let cells: Vec<String> = columns
            .iter()
            .map(|&c| {
                let precision = if c == 10 { 2 } else { 4 };
                format!("{:>width$.prec$}", values[c], width = column_width, prec = precision)
            })
            .collect();
        if use_colors {
            lines.push(format!("{} {}", index_str.dimmed(), cells.join(" ")));
        } else {
            lines.push(format!("{} {}", index_str, cells.join(" ")));
        }
    }

    lines.join("\n")
}

/// Saved predictions as tab-separated values for scripting (no header, no colors)
pub fn format_tsv(rows: &[LoggedPrediction]) -> String {
    rows.iter()
        .map(|row| {
            logged_values(row)
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
