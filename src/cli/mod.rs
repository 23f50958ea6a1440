/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{parse_count, Cli, ListRequest};
pub use commands::{describe_config, init_config, show_config_paths};
