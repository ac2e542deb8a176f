//! OrgTenure - tenure statistics for a reporting hierarchy
//!
//! A CLI tool that looks up a manager in Entra ID through Microsoft Graph,
//! walks all direct and indirect reports breadth-first, and reports working
//! days and elapsed years since each person's hire date.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (configuration, authentication, manager not found, API error)

mod cli;
mod config;
mod directory;
mod hierarchy;
mod models;
mod report;
mod tenure;

use anyhow::{Context, Result};
use chrono::Local;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use directory::{AttributeSelector, GraphConfig, GraphDirectory};
use hierarchy::{HierarchyWalker, WalkError, WalkOptions};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("OrgTenure v{}", env!("CARGO_PKG_VERSION"));
    debug!("Manager: {}", args.manager_upn());

    if let Err(e) = run_report(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        print_remediation_hints(&e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .orgtenure.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set tenant_id, client_id and hire_date_attribute before running.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report written to stdout stays clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Resolve the manager, walk the hierarchy, aggregate and emit the report.
async fn run_report(args: Args) -> Result<()> {
    // Captured once so every entity is measured against the same day.
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let manager = args.manager_upn().trim().to_string();
    let directory = GraphDirectory::new(GraphConfig {
        tenant_id: config.directory.tenant_id.clone(),
        client_id: config.directory.client_id.clone(),
        client_secret: args.client_secret.clone().unwrap_or_default(),
        graph_url: config.directory.graph_url.clone(),
        authority_url: config.directory.authority_url.clone(),
        scope: config.directory.scope.clone(),
        timeout_seconds: config.directory.timeout_seconds,
    })
    .context("Failed to create directory client")?;

    let select = AttributeSelector::new(config.directory.hire_date_attribute.clone());
    let options = WalkOptions {
        page_size: config.directory.page_size,
        show_progress: config.report.progress,
    };
    let walker = HierarchyWalker::new(&directory, select, options);

    if !args.quiet {
        eprintln!(
            "Finding all direct and indirect reports for manager: {} ...",
            manager
        );
    }

    let set = walker.walk_principal(&manager).await?;
    info!("Aggregating tenure as of {}", as_of);

    let tenure_report = tenure::aggregate(&set, as_of);
    if tenure_report.summary.with_hire_date == 0 {
        warn!(
            "No usable hire dates found in attribute '{}'",
            config.directory.hire_date_attribute
        );
    }

    let content = report::render(&tenure_report, config.report.format)?;

    match config.report.output {
        Some(ref output) => {
            let path = Path::new(output);
            report::write_report(&content, path)?;
            info!("Report saved to {}", path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Print setup guidance after a failure.
fn print_remediation_hints(err: &anyhow::Error) {
    if let Some(WalkError::RootNotFound(_)) = err.downcast_ref::<WalkError>() {
        eprintln!("\nCheck the manager's user principal name and that the account exists in the tenant.");
        return;
    }

    eprintln!("\nEnsure the Entra ID app registration is configured correctly:");
    eprintln!("1. Granted appropriate Application Permissions (e.g., User.Read.All).");
    eprintln!("2. Granted Admin Consent for these permissions.");
    eprintln!("3. Correctly set the Tenant ID, Client ID, Client Secret, and manager principal name.");
}
