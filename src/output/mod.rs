pub mod formatter;

pub use formatter::{
    format_breakdown, format_history_table, format_prediction, format_prediction_line,
    format_scaling_table, format_tsv, should_use_colors,
};
