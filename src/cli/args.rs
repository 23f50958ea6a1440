use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::app::PartialConfig;

#[derive(Parser, Debug)]
#[command(name = "listgen")]
#[command(version)]
#[command(
    about = "Generate a numbered list of things with a language model, streamed to the terminal",
    long_about = None
)]
pub struct Cli {
    /// How many items to generate (positive integer)
    #[arg(
        allow_negative_numbers = true,
        required_unless_present_any = ["show_config_paths", "init_config"]
    )]
    pub count: Option<String>,

    /// What to list, e.g. "colors" or "famous bridges"
    #[arg(
        num_args = 1..,
        required_unless_present_any = ["show_config_paths", "init_config"]
    )]
    pub concept: Vec<String>,

    /// Model to use (e.g., openai/gpt-4o-mini)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL of the chat completions API
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// API key (overrides OPENROUTER_API_KEY and config files)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Prompt template; {count} and {concept} are substituted
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to an extra configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the configuration files that are consulted, then exit
    #[arg(long)]
    pub show_config_paths: bool,

    /// Create a template user configuration file, then exit
    #[arg(long, conflicts_with = "show_config_paths")]
    pub init_config: bool,
}

/// Validated positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub count: u32,
    pub concept: String,
}

impl Cli {
    /// Settings given on the command line, as the highest-precedence layer
    pub fn overrides(&self) -> PartialConfig {
        PartialConfig {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            prompt_template: self.prompt.clone(),
            // An absent flag must not turn verbosity off from a config file
            verbose: self.verbose.then_some(true),
        }
    }

    /// Count and concept, checked
    pub fn list_request(&self) -> Result<ListRequest> {
        let Some(raw_count) = self.count.as_deref() else {
            bail!("Missing <count> argument");
        };
        let count = parse_count(raw_count)?;

        let concept = self.concept.join(" ");
        if concept.trim().is_empty() {
            bail!("Missing <concept> argument");
        }

        Ok(ListRequest { count, concept })
    }
}

/// Parse the item count; it must be a positive integer
pub fn parse_count(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => bail!("Count must be a positive integer, got '{}'", raw),
    }
}
