// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod traits;
mod types;
mod unified;

// Public re-exports - the ONLY way to access model functionality
pub use factory::{require_api_key, ModelFactory};
#[cfg(test)]
pub use traits::MockModel;
pub use traits::Model;
pub use types::{ChatMessage, ChatRequestBody, GenerationRequest, MessageRole};
pub use unified::UnifiedModel;
