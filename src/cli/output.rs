//! Output formatting for CLI commands

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting across commands
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a result struct as single-line JSON (JSON mode only)
    pub fn json<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string(data)?);
        }
        Ok(())
    }

    /// Prints a line (text mode only)
    pub fn line(&self, message: impl AsRef<str>) {
        if self.format == OutputFormat::Text {
            println!("{}", message.as_ref());
        }
    }

    /// Prints an indented `key: value` line (text mode only)
    pub fn field(&self, key: &str, value: impl std::fmt::Display) {
        if self.format == OutputFormat::Text {
            println!("  {}: {}", key, value);
        }
    }

    /// Prints a blank line (text mode only)
    pub fn blank(&self) {
        if self.format == OutputFormat::Text {
            println!();
        }
    }
}
