use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_PROMPT_TEMPLATE,
};
use crate::utils::{log_debug, log_warn};

/// Fully merged settings for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Model identifier understood by the endpoint
    pub model: String,
    /// Base URL of the chat completions API
    pub endpoint: String,
    /// Bearer token; absence is reported before any request is made
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Template with `{count}` and `{concept}` placeholders
    #[serde(rename = "prompt")]
    pub prompt_template: String,
    /// Extra diagnostics on stderr
    pub verbose: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            verbose: false,
        }
    }
}

impl ResolvedConfig {
    /// Render as TOML with the API key masked, for verbose output
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.api_key = shown.api_key.as_deref().map(mask_secret);
        toml::to_string_pretty(&shown).context("Failed to render configuration")
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

/// Configuration values contributed by a single source
///
/// Fields a source does not mention stay `None` and are never serialized,
/// so merging one layer over another only touches the fields it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "prompt", default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

impl PartialConfig {
    /// Partial mapping carrying only an API key
    pub fn api_key_only(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
        .normalized()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// An empty API key means "not configured"
    fn normalized(mut self) -> Self {
        if self.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.api_key = None;
        }
        self
    }

    /// Parse the TOML text of a config file
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, figment::Error> {
        Figment::from(Toml::string(content))
            .extract::<Self>()
            .map(Self::normalized)
    }
}

/// Origin of a configuration layer, in ascending precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    System,
    User,
    Override,
    Environment,
    CommandLine,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Override => "override",
            Self::Environment => "environment",
            Self::CommandLine => "command line",
        };
        f.write_str(name)
    }
}

/// What reading one config file produced
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLoad {
    /// File does not exist
    Missing,
    /// File parsed; may still be empty
    Loaded(PartialConfig),
    /// File exists but could not be read or parsed
    Invalid(String),
}

/// One file layer after loading
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigSource,
    pub path: PathBuf,
    pub load: SourceLoad,
}

impl ConfigLayer {
    /// The values this layer contributes to the merge
    pub fn partial(&self) -> PartialConfig {
        match &self.load {
            SourceLoad::Loaded(partial) => partial.clone(),
            SourceLoad::Missing | SourceLoad::Invalid(_) => PartialConfig::default(),
        }
    }

    /// Non-fatal problem worth telling the user about
    ///
    /// Missing system and user files are normal; a missing file that was
    /// asked for explicitly is not.
    pub fn warning(&self) -> Option<String> {
        match &self.load {
            SourceLoad::Invalid(reason) => Some(format!(
                "Ignoring {} config {}: {}",
                self.source,
                self.path.display(),
                reason
            )),
            SourceLoad::Missing if self.source == ConfigSource::Override => Some(format!(
                "Config file {} not found, continuing without it",
                self.path.display()
            )),
            _ => None,
        }
    }
}

/// Outcome of `create_default_user_config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(PathBuf),
    AlreadyPresent(PathBuf),
    /// No user config location could be determined on this platform
    Unavailable,
}

/// Reads the ranked config sources and merges them
#[derive(Debug, Clone)]
pub struct ConfigStore {
    system_path: Option<PathBuf>,
    user_path: Option<PathBuf>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Store using the platform's well-known locations
    pub fn new() -> Self {
        Self {
            system_path: system_config_path(),
            user_path: user_config_path(),
        }
    }

    /// Store with explicit locations, mainly for tests
    pub fn with_paths(system_path: Option<PathBuf>, user_path: Option<PathBuf>) -> Self {
        Self {
            system_path,
            user_path,
        }
    }

    /// Ordered file locations that would be consulted. Does not touch the filesystem.
    pub fn list_config_paths(&self, override_path: Option<&Path>) -> Vec<(ConfigSource, PathBuf)> {
        let mut paths = Vec::with_capacity(3);
        if let Some(system) = &self.system_path {
            paths.push((ConfigSource::System, system.clone()));
        }
        if let Some(user) = &self.user_path {
            paths.push((ConfigSource::User, user.clone()));
        }
        if let Some(path) = override_path {
            paths.push((ConfigSource::Override, path.to_path_buf()));
        }
        paths
    }

    /// Load every file layer in ascending precedence
    pub fn load_layers(&self, override_path: Option<&Path>) -> Vec<ConfigLayer> {
        self.list_config_paths(override_path)
            .into_iter()
            .map(|(source, path)| {
                let load = load_source(&path);
                ConfigLayer { source, path, load }
            })
            .collect()
    }

    /// Merge defaults, files, the environment API key and CLI overrides
    ///
    /// File problems are logged as warnings and the offending layer is
    /// skipped; they never abort resolution.
    pub fn resolve(
        &self,
        override_path: Option<&Path>,
        env_api_key: Option<String>,
        cli_overrides: &PartialConfig,
    ) -> Result<ResolvedConfig> {
        let layers = self.load_layers(override_path);
        for layer in &layers {
            match layer.warning() {
                Some(warning) => log_warn("[config]", warning),
                None => log_debug(format!(
                    "{} config {}: {}",
                    layer.source,
                    layer.path.display(),
                    match layer.load {
                        SourceLoad::Loaded(_) => "loaded",
                        _ => "not present",
                    }
                )),
            }
        }

        let mut partials: Vec<(ConfigSource, PartialConfig)> = layers
            .iter()
            .map(|layer| (layer.source, layer.partial()))
            .collect();
        partials.push((
            ConfigSource::Environment,
            PartialConfig::api_key_only(env_api_key),
        ));
        partials.push((ConfigSource::CommandLine, cli_overrides.clone().normalized()));

        merge_layers(&partials)
    }

    /// Create the user config directory and a commented template file
    ///
    /// Only acts when neither the directory nor the file exists yet; an
    /// existing file is never overwritten.
    pub fn create_default_user_config(&self) -> Result<InitOutcome> {
        let Some(path) = &self.user_path else {
            return Ok(InitOutcome::Unavailable);
        };

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        if path.exists() || dir.exists() {
            return Ok(InitOutcome::AlreadyPresent(path.clone()));
        }

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        std::fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(InitOutcome::Created(path.clone()))
    }
}

/// Field-level merge of partial mappings over the built-in defaults
pub fn merge_layers(layers: &[(ConfigSource, PartialConfig)]) -> Result<ResolvedConfig> {
    let mut figment = Figment::from(Serialized::defaults(ResolvedConfig::default()));
    for (_, partial) in layers {
        if !partial.is_empty() {
            figment = figment.merge(Serialized::defaults(partial));
        }
    }

    figment
        .extract::<ResolvedConfig>()
        .context("Failed to merge configuration")
}

fn load_source(path: &Path) -> SourceLoad {
    if !path.exists() {
        return SourceLoad::Missing;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return SourceLoad::Invalid(format!("could not read file: {}", e)),
    };

    match PartialConfig::from_toml_str(&content) {
        Ok(partial) => SourceLoad::Loaded(partial),
        Err(e) => SourceLoad::Invalid(format!("could not parse file: {}", e)),
    }
}

/// System-wide config file location
pub fn system_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        Some(PathBuf::from(crate::constants::SYSTEM_CONFIG_DIR).join(CONFIG_FILE_NAME))
    }
    #[cfg(windows)]
    {
        use crate::constants::{DEFAULT_PROGRAM_DATA, PROGRAM_DATA_ENV};
        let base = std::env::var_os(PROGRAM_DATA_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM_DATA));
        Some(base.join(APP_NAME).join(CONFIG_FILE_NAME))
    }
    #[cfg(not(any(unix, windows)))]
    {
        None
    }
}

/// Per-user config file location
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
        return Some(proj_dirs.config_dir().join(CONFIG_FILE_NAME));
    }

    // Fallback to home directory
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join(APP_NAME)
                .join(CONFIG_FILE_NAME)
        })
}

fn default_config_template() -> String {
    format!(
        r#"# listgen user configuration
# Uncomment a key to override the built-in default.
# Precedence: system file < this file < --config file < ${env} < command line flags

# model = "{model}"
# endpoint = "{endpoint}"
# apiKey = "sk-or-..."
# prompt = "{prompt}"
# verbose = false
"#,
        env = crate::constants::API_KEY_ENV,
        model = DEFAULT_MODEL,
        endpoint = DEFAULT_ENDPOINT,
        prompt = DEFAULT_PROMPT_TEMPLATE,
    )
}
