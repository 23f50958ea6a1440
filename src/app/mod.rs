// Gateway module for app - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod config;

// Public re-exports - the ONLY way to access app functionality
pub use config::{
    merge_layers, system_config_path, user_config_path, ConfigLayer, ConfigSource, ConfigStore,
    InitOutcome, PartialConfig, ResolvedConfig, SourceLoad,
};
