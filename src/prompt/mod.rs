/// Prompt template rendering - Gateway
mod renderer;

pub use renderer::render;
