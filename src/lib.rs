pub mod app;
pub mod cli;
pub mod constants;
pub mod models;
pub mod prompt;
pub mod runtime;
pub mod stream;
pub mod utils;

pub use app::{ConfigStore, PartialConfig, ResolvedConfig};
pub use models::{GenerationRequest, Model, ModelFactory};
pub use runtime::{generate, Orchestrator};
pub use stream::{decode, OutputSink, StreamEvent};
pub use utils::ListgenError;
