//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.orgtenure.toml` files.

use crate::cli::OutputFormat;
use crate::hierarchy::MAX_PAGE_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".orgtenure.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory service settings.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Directory service connection and query settings.
///
/// The client secret is deliberately absent; it only comes from the
/// command line or the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Entra ID tenant.
    #[serde(default)]
    pub tenant_id: String,

    /// App registration client id.
    #[serde(default)]
    pub client_id: String,

    /// Graph API root.
    #[serde(default = "default_graph_url")]
    pub graph_url: String,

    /// OAuth2 authority root.
    #[serde(default = "default_authority_url")]
    pub authority_url: String,

    /// Scope requested with the client-credentials grant.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Attribute holding the hire date, e.g. `extension_<app id>_hireDate`.
    #[serde(default = "default_hire_date_attribute")]
    pub hire_date_attribute: String,

    /// Page size for direct-reports listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            graph_url: default_graph_url(),
            authority_url: default_authority_url(),
            scope: default_scope(),
            hire_date_attribute: default_hire_date_attribute(),
            page_size: default_page_size(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_graph_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_authority_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_scope() -> String {
    "https://graph.microsoft.com/.default".to_string()
}

fn default_hire_date_attribute() -> String {
    "employeeHireDate".to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_timeout() -> u64 {
    30
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout.
    #[serde(default)]
    pub output: Option<String>,

    /// Show a spinner while walking the hierarchy.
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output: None,
            progress: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.orgtenure.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        let dir = &mut self.directory;

        if let Some(ref tenant_id) = args.tenant_id {
            dir.tenant_id = tenant_id.clone();
        }
        if let Some(ref client_id) = args.client_id {
            dir.client_id = client_id.clone();
        }
        if let Some(ref graph_url) = args.graph_url {
            dir.graph_url = graph_url.clone();
        }
        if let Some(ref attribute) = args.hire_date_attribute {
            dir.hire_date_attribute = attribute.clone();
        }
        if let Some(page_size) = args.page_size {
            dir.page_size = page_size;
        }
        if let Some(timeout) = args.timeout {
            dir.timeout_seconds = timeout;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref output) = args.output {
            self.report.output = Some(output.display().to_string());
        }
        if args.no_progress || args.quiet {
            self.report.progress = false;
        }
    }

    /// Check values that would only fail later at the first request.
    pub fn validate(&self) -> Result<(), String> {
        let dir = &self.directory;

        if dir.tenant_id.trim().is_empty() {
            return Err(
                "Tenant id is required (--tenant-id, AZURE_TENANT_ID or [directory].tenant_id)"
                    .to_string(),
            );
        }
        if dir.client_id.trim().is_empty() {
            return Err(
                "Client id is required (--client-id, AZURE_CLIENT_ID or [directory].client_id)"
                    .to_string(),
            );
        }
        if dir.hire_date_attribute.trim().is_empty() {
            return Err("Hire date attribute must not be empty".to_string());
        }
        if !(1..=MAX_PAGE_SIZE).contains(&dir.page_size) {
            return Err(format!("Page size must be between 1 and {}", MAX_PAGE_SIZE));
        }
        if dir.timeout_seconds == 0 {
            return Err("Timeout must be at least 1 second".to_string());
        }
        for (name, url) in [("Graph", &dir.graph_url), ("Authority", &dir.authority_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{} URL must start with 'http://' or 'https://'", name));
            }
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
