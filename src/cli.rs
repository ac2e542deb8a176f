//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Options left unset fall back to the config file.

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// OrgTenure - tenure statistics for a whole reporting line
///
/// Looks up a manager in Entra ID via Microsoft Graph, walks every direct
/// and indirect report, and totals working days and elapsed years since
/// each person's hire date.
///
/// Examples:
///   orgtenure --manager first.last@company.com
///   orgtenure -m first.last@company.com --hire-date-attribute extension_<app>_hireDate
///   orgtenure -m first.last@company.com --format json --output tenure.json
///   orgtenure --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Principal name of the manager at the top of the hierarchy
    #[arg(short, long, value_name = "UPN", required_unless_present = "init_config")]
    pub manager: Option<String>,

    /// Entra ID tenant id
    #[arg(long, value_name = "ID", env = "AZURE_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// App registration client id
    #[arg(long, value_name = "ID", env = "AZURE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// App registration client secret
    ///
    /// Prefer the environment variable so the secret stays out of shell history.
    #[arg(long, value_name = "SECRET", env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Directory attribute holding the hire date
    ///
    /// Defaults to employeeHireDate. Directory schema extensions look like
    /// extension_<app id without dashes>_hireDate.
    #[arg(long, value_name = "NAME")]
    pub hire_date_attribute: Option<String>,

    /// Page size for direct-reports listings (1-999)
    #[arg(long, value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Microsoft Graph API root URL
    #[arg(long, value_name = "URL")]
    pub graph_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Measure tenure up to this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Output format (text, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .orgtenure.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no spinner)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Generate a default .orgtenure.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain console text (default)
    #[default]
    Text,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The manager's principal name (empty if unset; validate first).
    pub fn manager_upn(&self) -> &str {
        self.manager.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        let manager = self.manager_upn().trim();
        if manager.is_empty() {
            return Err("Manager principal name must not be empty".to_string());
        }
        if !manager.contains('@') {
            return Err(format!(
                "Manager must be a user principal name (name@domain), got '{}'",
                manager
            ));
        }

        match self.client_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {}
            _ => {
                return Err(
                    "Client secret is required (--client-secret or AZURE_CLIENT_SECRET)".to_string(),
                )
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
