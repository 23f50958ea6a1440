use std::fmt;

use crate::{
    app::ResolvedConfig,
    models::{require_api_key, GenerationRequest, Model, ModelFactory},
    prompt::render,
    stream::{decode, forward_to_sink, OutputSink},
    utils::{log_debug, log_info, Result},
};

/// Lifecycle of one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    /// Request sent, waiting for the response head
    Sending,
    /// Response accepted, body being decoded
    Streaming,
    Complete,
    Failed,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Streaming => "streaming",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs a single list generation from resolved settings to final text
pub struct Orchestrator {
    config: ResolvedConfig,
    state: GenerationState,
}

impl Orchestrator {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            config,
            state: GenerationState::Idle,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Request for `count` items of `concept` under the configured template
    pub fn build_request(&self, count: u32, concept: &str) -> GenerationRequest {
        let prompt_text = render(&self.config.prompt_template, count, concept);
        GenerationRequest::new(self.config.model.clone(), prompt_text)
    }

    /// Generate the list against the configured endpoint
    ///
    /// Fragments are written to `sink` as they arrive; the full text is
    /// returned once the stream ends.
    pub async fn generate(
        &mut self,
        count: u32,
        concept: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<String> {
        let model = match ModelFactory::create(&self.config) {
            Ok(model) => model,
            Err(e) => {
                self.transition(GenerationState::Failed);
                return Err(e);
            }
        };
        self.generate_with(model.as_ref(), count, concept, sink).await
    }

    /// Same as `generate`, against a caller-supplied backend
    pub async fn generate_with(
        &mut self,
        model: &dyn Model,
        count: u32,
        concept: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<String> {
        let result = self.run(model, count, concept, sink).await;
        match &result {
            Ok(text) => {
                self.transition(GenerationState::Complete);
                log_info("[done]", format!("received {} characters", text.len()));
            }
            Err(e) => {
                self.transition(GenerationState::Failed);
                log_debug(format!("generation failed: {}", e));
            }
        }
        result
    }

    async fn run(
        &mut self,
        model: &dyn Model,
        count: u32,
        concept: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<String> {
        require_api_key(&self.config)?;
        let request = self.build_request(count, concept);

        self.transition(GenerationState::Sending);
        let body = model.stream_chat(&request).await?;

        self.transition(GenerationState::Streaming);
        let outcome = forward_to_sink(decode(body), sink).await?;
        log_debug(format!(
            "stream finished: {} fragments, {} malformed records skipped, sentinel seen: {}",
            outcome.fragments, outcome.malformed, outcome.completed
        ));

        Ok(outcome.text)
    }

    fn transition(&mut self, next: GenerationState) {
        log_debug(format!("generation state {} -> {}", self.state, next));
        self.state = next;
    }
}

/// One-shot generation for callers that do not need the state machine
pub async fn generate(
    config: &ResolvedConfig,
    count: u32,
    concept: &str,
    sink: &mut dyn OutputSink,
) -> Result<String> {
    Orchestrator::new(config.clone())
        .generate(count, concept, sink)
        .await
}
