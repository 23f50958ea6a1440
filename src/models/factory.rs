use super::traits::Model;
use super::unified::UnifiedModel;
use crate::app::ResolvedConfig;
use crate::constants::API_KEY_ENV;
use crate::utils::{ListgenError, Result};

/// Factory for creating model instances from the resolved configuration
pub struct ModelFactory;

impl ModelFactory {
    /// Create the backend for `config.endpoint`
    ///
    /// Fails with a configuration error when no API key is set; nothing is
    /// sent over the network in that case.
    pub fn create(config: &ResolvedConfig) -> Result<Box<dyn Model>> {
        let api_key = require_api_key(config)?;
        let model = UnifiedModel::new(&config.endpoint, api_key.to_string())?;
        Ok(Box::new(model))
    }
}

/// The configured API key, or the error explaining how to set one
pub fn require_api_key(config: &ResolvedConfig) -> Result<&str> {
    config
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            ListgenError::config(format!(
                "No API key configured. Set {}, pass --api-key, or add apiKey to a config file",
                API_KEY_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let config = ResolvedConfig::default();
        assert!(matches!(
            require_api_key(&config),
            Err(ListgenError::ConfigError(_))
        ));
        assert!(matches!(
            ModelFactory::create(&config),
            Err(ListgenError::ConfigError(_))
        ));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = ResolvedConfig {
            api_key: Some("   ".to_string()),
            ..ResolvedConfig::default()
        };
        assert!(require_api_key(&config).is_err());
    }

    #[test]
    fn test_create_with_key() {
        let config = ResolvedConfig {
            api_key: Some("sk-test".to_string()),
            ..ResolvedConfig::default()
        };
        assert_eq!(require_api_key(&config).unwrap(), "sk-test");
        assert!(ModelFactory::create(&config).is_ok());
    }
}
