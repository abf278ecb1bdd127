pub mod catalog;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_file_extensions, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// Single calculation: one JSON request in, one JSON response out.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "cell-splitter")]
#[command(about = "Seeding and dilution planner for cell culture passages")]
pub struct CliConfig {
    /// JSON request file; reads stdin when omitted or "-"
    #[arg(short, long)]
    pub request: Option<String>,

    /// TOML catalog of vessels, cell lines and cultures (defaults to the built-in one)
    #[arg(short, long, env = "CELL_SPLITTER_CATALOG")]
    pub catalog: Option<String>,

    /// Print the cell lines with their doubling times instead of calculating
    #[arg(long)]
    pub list_cell_lines: bool,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(request) = self.request.as_deref().filter(|r| *r != "-") {
            validate_path("request", request)?;
        }
        if let Some(catalog) = &self.catalog {
            validate_path("catalog", catalog)?;
            validate_file_extensions("catalog", std::slice::from_ref(catalog), &["toml"])?;
        }
        Ok(())
    }
}

/// Bulk planning over a CSV of requests.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "bulk-seeding")]
#[command(about = "Plan seeding and dilutions for every row of a CSV file")]
pub struct BulkConfig {
    /// CSV file whose headers are calculator request fields
    #[arg(short, long)]
    pub input: String,

    #[arg(short, long, default_value = "./output")]
    pub output_path: String,

    #[arg(short, long, env = "CELL_SPLITTER_CATALOG")]
    pub catalog: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for BulkConfig {
    fn input_file(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

#[cfg(feature = "cli")]
impl Validate for BulkConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extensions("input", std::slice::from_ref(&self.input), &["csv"])?;
        validate_path("output_path", &self.output_path)?;
        if let Some(catalog) = &self.catalog {
            validate_file_extensions("catalog", std::slice::from_ref(catalog), &["toml"])?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_config_validation() {
        let config = BulkConfig::parse_from(["bulk-seeding", "--input", "plates.csv"]);
        assert_eq!(config.output_path, "./output");
        assert!(config.validate().is_ok());

        let config = BulkConfig::parse_from(["bulk-seeding", "--input", "plates.xlsx"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_config_accepts_stdin_marker() {
        let config = CliConfig::parse_from(["cell-splitter", "--request", "-"]);
        assert!(config.validate().is_ok());

        let config = CliConfig::parse_from(["cell-splitter", "--catalog", "vessels.json"]);
        assert!(config.validate().is_err());
    }
}
