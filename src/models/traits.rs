use async_trait::async_trait;

use super::types::GenerationRequest;
use crate::stream::ByteStream;
use crate::utils::Result;

/// Core trait that all model backends must implement
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Model: Send + Sync {
    /// Send the request and hand back the raw response body once the server
    /// has accepted it
    ///
    /// Errors before any body byte arrives are classified here; errors while
    /// reading the body surface as items of the returned stream.
    async fn stream_chat(&self, request: &GenerationRequest) -> Result<ByteStream>;
}
