use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use listgen::{
    app::ConfigStore,
    cli::{describe_config, init_config, show_config_paths, Cli},
    constants::API_KEY_ENV,
    runtime::Orchestrator,
    stream::WriterSink,
    utils::{init_logger, log_status},
};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Set up logging; verbose from a config file only affects diagnostics
    init_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = ConfigStore::new();

    // Diagnostic flags short-circuit normal operation
    if cli.show_config_paths {
        show_config_paths(&store, cli.config.as_deref());
        return Ok(());
    }
    if cli.init_config {
        return init_config(&store);
    }

    let request = cli.list_request()?;

    // Environment is read here and handed to the store explicitly
    let env_api_key = std::env::var(API_KEY_ENV).ok();
    let config = store.resolve(cli.config.as_deref(), env_api_key, &cli.overrides())?;

    if config.verbose {
        describe_config(&config)?;
        log_status(format!(
            "Requesting {} {} from {}",
            request.count,
            request.concept,
            config.model.cyan()
        ));
    }

    let mut orchestrator = Orchestrator::new(config);
    let mut sink = WriterSink::stdout();
    let result = orchestrator
        .generate(request.count, &request.concept, &mut sink)
        .await;

    // End partial output too, so an error message starts on its own line
    if !sink.at_line_start() {
        println!();
    }

    result.context("List generation failed")?;
    Ok(())
}
