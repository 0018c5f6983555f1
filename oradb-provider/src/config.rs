//! Provider configuration
//!
//! Values come from the `provider` block of the configuration file and fall
//! back to `ARM_*` environment variables.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Connection settings for the resource-manager API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub subscription_id: String,
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub poll_interval_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            subscription_id: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: String::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            user_agent: format!("oradb/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration problems detected before any call is made
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("subscription_id is not set (configure it or export ARM_SUBSCRIPTION_ID)")]
    MissingSubscription,
    #[error("access token is not set (export ARM_ACCESS_TOKEN)")]
    MissingToken,
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

impl ProviderConfig {
    /// Build a configuration purely from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Fill unset fields from the environment
    pub fn merge_env(&mut self) -> Result<(), ConfigError> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    fn merge_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if self.subscription_id.is_empty()
            && let Some(v) = lookup("ARM_SUBSCRIPTION_ID")
        {
            self.subscription_id = v;
        }
        if self.access_token.is_empty()
            && let Some(v) = lookup("ARM_ACCESS_TOKEN")
        {
            self.access_token = v;
        }
        if self.endpoint == DEFAULT_ENDPOINT
            && let Some(v) = lookup("ARM_ENDPOINT")
        {
            self.endpoint = v;
        }
        if self.poll_interval_secs == DEFAULT_POLL_INTERVAL_SECS
            && let Some(v) = lookup("ARM_POLL_INTERVAL")
        {
            self.poll_interval_secs = v.parse().map_err(|_| ConfigError::Invalid {
                name: "ARM_POLL_INTERVAL",
                value: v.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subscription_id.trim().is_empty() {
            return Err(ConfigError::MissingSubscription);
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if !self.endpoint.starts_with("https://") && !self.endpoint.starts_with("http://") {
            return Err(ConfigError::Invalid {
                name: "endpoint",
                value: self.endpoint.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_fills_unset_fields() {
        let mut config = ProviderConfig::default();
        config
            .merge_env_with(env(&[
                ("ARM_SUBSCRIPTION_ID", "sub"),
                ("ARM_ACCESS_TOKEN", "tok"),
                ("ARM_POLL_INTERVAL", "2"),
            ]))
            .unwrap();
        assert_eq!(config.subscription_id, "sub");
        assert_eq!(config.access_token, "tok");
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_values_win_over_env() {
        let mut config: ProviderConfig =
            serde_json::from_value(serde_json::json!({"subscription_id": "from-file"})).unwrap();
        config
            .merge_env_with(env(&[("ARM_SUBSCRIPTION_ID", "from-env")]))
            .unwrap();
        assert_eq!(config.subscription_id, "from-file");
    }

    #[test]
    fn invalid_poll_interval_is_rejected() {
        let mut config = ProviderConfig::default();
        let err = config
            .merge_env_with(env(&[("ARM_POLL_INTERVAL", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn validate_requires_subscription_and_token() {
        let config = ProviderConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingSubscription));

        let config = ProviderConfig {
            subscription_id: "sub".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingToken));
    }

    #[test]
    fn access_token_is_not_serialized() {
        let config = ProviderConfig {
            access_token: "secret".to_string(),
            ..ProviderConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
