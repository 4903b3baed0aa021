pub mod formatter;

pub use formatter::{
    format_breakdown, format_csv, format_json, format_result_detail, format_score_line,
    format_scored_table, format_summary, format_tsv, should_use_colors, OutputFormat,
};
