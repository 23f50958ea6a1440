use serde::Deserialize;

/// One decoded unit of the response stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental piece of generated text
    ContentFragment(String),
    /// The `[DONE]` sentinel; nothing after it is read
    Done,
    /// A `data:` payload that was not valid JSON, kept raw for diagnostics
    Malformed(String),
}

// Payload structures for streamed chat completions (OpenAI format).
// Everything is optional so unrelated chunks (usage, role-only deltas)
// parse cleanly and simply carry no text.

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

impl StreamChunk {
    /// Text at `choices[0].delta.content`, if any
    pub(crate) fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
    }
}
