/// Constants module to avoid magic numbers in the codebase

// Application identity
pub const APP_NAME: &str = "listgen";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Network Configuration
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

// Default Model Configuration
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Generate a numbered list of {count} {concept}. \
Respond with the list only, one item per line, numbered from 1 to {count}.";

// Fixed generation parameters
pub const GENERATION_MAX_TOKENS: u32 = 2000;
pub const GENERATION_TEMPERATURE: f32 = 0.7;

// Prompt placeholders
pub const COUNT_PLACEHOLDER: &str = "{count}";
pub const CONCEPT_PLACEHOLDER: &str = "{concept}";

// Event stream framing
pub const SSE_DATA_PREFIX: &str = "data: ";
pub const SSE_DONE_SENTINEL: &str = "[DONE]";

// System-wide config locations
#[cfg(target_os = "macos")]
pub const SYSTEM_CONFIG_DIR: &str = "/Library/Application Support/listgen";
#[cfg(all(unix, not(target_os = "macos")))]
pub const SYSTEM_CONFIG_DIR: &str = "/etc/listgen";
#[cfg(windows)]
pub const PROGRAM_DATA_ENV: &str = "PROGRAMDATA";
#[cfg(windows)]
pub const DEFAULT_PROGRAM_DATA: &str = r"C:\ProgramData";
