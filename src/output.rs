//! Result printing.
//!
//! Rows and errors go through the same function so the command line prints
//! both the same way.

use crate::error::Result;
use crate::remote::Row;
use clap::ValueEnum;

/// How rows are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One indented JSON array.
    #[default]
    Pretty,
    /// One JSON object per line.
    JsonLines,
}

/// Renders a query outcome as text.
pub fn render_outcome(outcome: &Result<Vec<Row>>, format: OutputFormat) -> String {
    match outcome {
        Ok(rows) => render_rows(rows, format),
        Err(e) => format!("{}: {}", e.category(), e),
    }
}

fn render_rows(rows: &[Row], format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(rows)
            .unwrap_or_else(|e| format!("<unserializable rows: {e}>")),
        OutputFormat::JsonLines => rows
            .iter()
            .map(Row::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Prints a query outcome to stdout.
pub fn print_outcome(outcome: &Result<Vec<Row>>, format: OutputFormat) {
    println!("{}", render_outcome(outcome, format));
}
