use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::app::{ConfigStore, InitOutcome, ResolvedConfig};
use crate::constants::API_KEY_ENV;

/// Print every configuration location in precedence order
pub fn show_config_paths(store: &ConfigStore, override_path: Option<&Path>) {
    println!("Configuration files (lowest to highest precedence):");
    for (source, path) in store.list_config_paths(override_path) {
        let status = if path.exists() {
            "[found]".green()
        } else {
            "[missing]".yellow()
        };
        println!("  {:<9} {} {}", source.to_string(), status, path.display());
    }
    println!("  Then the {} environment variable, then command line flags.", API_KEY_ENV);
}

/// Create the user config template and report what happened
pub fn init_config(store: &ConfigStore) -> Result<()> {
    match store.create_default_user_config()? {
        InitOutcome::Created(path) => {
            println!("{} Created configuration at: {}", "[OK]".green(), path.display());
        }
        InitOutcome::AlreadyPresent(path) => {
            println!(
                "{} Configuration location already exists, left untouched: {}",
                "[SKIP]".yellow(),
                path.display()
            );
        }
        InitOutcome::Unavailable => {
            println!(
                "{} Could not determine a user configuration directory",
                "[ERROR]".red()
            );
        }
    }
    Ok(())
}

/// Effective settings on stderr, for `--verbose`
pub fn describe_config(config: &ResolvedConfig) -> Result<()> {
    eprintln!("{}", "Effective configuration:".bold());
    for line in config.to_redacted_toml()?.lines() {
        eprintln!("  {}", line);
    }
    Ok(())
}
