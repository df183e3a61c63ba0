//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders results in the format selected by `--output`. Tables use
//! `tabled`, structured formats use serde, plain emits bare values.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

// ── Color helpers ────────────────────────────────────────────────────

/// Color only on an interactive stdout, and never under `NO_COLOR`.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Green "success" / red "failure" label.
pub fn status_label(success: bool, color: bool) -> String {
    match (success, color) {
        (true, true) => "success".green().bold().to_string(),
        (false, true) => "failure".red().bold().to_string(),
        (true, false) => "success".into(),
        (false, false) => "failure".into(),
    }
}

// ── Key/value detail view ────────────────────────────────────────────

#[derive(Tabled)]
struct Field<'a> {
    #[tabled(rename = "Field")]
    key: &'a str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Two-column table of labelled values.
pub fn render_fields(fields: &[(&str, String)]) -> String {
    let rows: Vec<Field<'_>> = fields
        .iter()
        .map(|(key, value)| Field {
            key,
            value: value.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Render dispatcher ────────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// `detail_fn` builds the table view; `plain_fn` the scripting view.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => plain_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end());
}

// ── Format-specific renderers ────────────────────────────────────────

/// Pretty-printed JSON.
pub(crate) fn render_json<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// YAML output.
pub(crate) fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: {e}"))
}
