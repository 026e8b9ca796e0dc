//! Terminal styling and tabular output for the CLI.

use comfy_table::{Table, presets::UTF8_FULL};
use console::Style;
use tabula_core::{IrModule, Level, TabulaErrorExt};

/// Styles for different output elements.
pub struct FormatStyle {
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub trace: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            info: Style::new().cyan().for_stderr(),
            warning: Style::new().yellow().for_stderr(),
            error: Style::new().red().bold().for_stderr(),
            trace: Style::new().dim().for_stderr(),
        }
    }
}

/// One row per user-defined function: source name, unique symbol and signature.
pub fn render_functions(module: &IrModule) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["name", "symbol", "parameters", "results"]);
    for function in &module.functions {
        let params = function
            .param_types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let results = function
            .result_types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            function.name.clone(),
            function.symbol.clone(),
            params,
            results,
        ]);
    }
    format!("{}\n", table)
}

/// Failures of the driver itself (bad config file, unwritable output).
#[derive(Debug, Clone)]
pub struct CliError {
    pub message: String,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl TabulaErrorExt for CliError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn issuer(&self) -> String {
        "tabula.cli".to_string()
    }

    fn span(&self) -> Option<tabula_core::Span> {
        None
    }

    fn location(&self) -> Option<tabula_core::Location> {
        None
    }
}
