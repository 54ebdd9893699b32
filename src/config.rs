//! Runtime configuration, read once at startup from the environment.

use crate::anthropic::{CLAUDE_SONNET, DEFAULT_ANTHROPIC_BASE_URL};
use crate::error::ConfigError;
use crate::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use std::path::PathBuf;
use std::time::Duration;

const OPENAI_KEY_PLACEHOLDER: &str = "your_openai_api_key_here";
const ANTHROPIC_KEY_PLACEHOLDER: &str = "your_anthropic_api_key_here";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn from_str(s: &str) -> Option<Provider> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub model: String,
    /// Clamped to 0.0..=1.0.
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    /// Skip the backend for the rest of a session after its first failure.
    pub sticky_backend_failure: bool,
    pub topic_markers: bool,
    pub owner_name: String,
    pub content_path: Option<PathBuf>,
    pub canned_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAI,
            openai_api_key: None,
            anthropic_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 500,
            request_timeout: Duration::from_secs(30),
            sticky_backend_failure: true,
            topic_markers: true,
            owner_name: "the portfolio owner".to_string(),
            content_path: None,
            canned_path: None,
            log_dir: None,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

fn parse_flag(key: &str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}

fn parse_temperature(key: &str, value: String) -> Result<f32, ConfigError> {
    let temperature: f32 = parse_value(key, value.clone())?;
    if !temperature.is_finite() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        });
    }
    Ok(temperature.clamp(0.0, 1.0))
}

fn usable_key(key: Option<&str>, placeholder: &str) -> bool {
    key.map(str::trim)
        .map(|k| !k.is_empty() && k != placeholder)
        .unwrap_or(false)
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("FOLIO_CHAT_PROVIDER") {
            config.provider =
                Provider::from_str(&value).ok_or_else(|| ConfigError::InvalidValue {
                    key: "FOLIO_CHAT_PROVIDER".to_string(),
                    value: value.clone(),
                })?;
        }

        config.openai_api_key = lookup("OPENAI_API_KEY");
        config.anthropic_api_key = lookup("ANTHROPIC_API_KEY");

        if let Some(url) = lookup("OPENAI_BASE_URL") {
            config.openai_base_url = url;
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            config.anthropic_base_url = url;
        }

        config.model = match (lookup("FOLIO_CHAT_MODEL"), config.provider) {
            (Some(model), _) => model,
            (None, Provider::OpenAI) => DEFAULT_OPENAI_MODEL.to_string(),
            (None, Provider::Anthropic) => CLAUDE_SONNET.to_string(),
        };

        if let Some(value) = lookup("FOLIO_CHAT_TEMPERATURE") {
            config.temperature = parse_temperature("FOLIO_CHAT_TEMPERATURE", value)?;
        }
        if let Some(value) = lookup("FOLIO_CHAT_MAX_TOKENS") {
            config.max_tokens = parse_value("FOLIO_CHAT_MAX_TOKENS", value)?;
        }
        if let Some(value) = lookup("FOLIO_CHAT_TIMEOUT_SECS") {
            let secs = parse_value("FOLIO_CHAT_TIMEOUT_SECS", value)?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("FOLIO_CHAT_STICKY_FAILURE") {
            config.sticky_backend_failure = parse_flag("FOLIO_CHAT_STICKY_FAILURE", value)?;
        }
        if let Some(value) = lookup("FOLIO_CHAT_TOPIC_MARKERS") {
            config.topic_markers = parse_flag("FOLIO_CHAT_TOPIC_MARKERS", value)?;
        }
        if let Some(owner) = lookup("FOLIO_CHAT_OWNER").filter(|o| !o.trim().is_empty()) {
            config.owner_name = owner.trim().to_string();
        }

        config.content_path = lookup("FOLIO_CHAT_CONTENT_PATH").map(PathBuf::from);
        config.canned_path = lookup("FOLIO_CHAT_CANNED_PATH").map(PathBuf::from);
        config.log_dir = lookup("FOLIO_CHAT_LOG_DIR").map(PathBuf::from);

        Ok(config)
    }

    /// Key for the selected provider, if any.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }

    /// True when the selected provider has a real (non-placeholder) key.
    pub fn is_backend_configured(&self) -> bool {
        let placeholder = match self.provider {
            Provider::OpenAI => OPENAI_KEY_PLACEHOLDER,
            Provider::Anthropic => ANTHROPIC_KEY_PLACEHOLDER,
        };
        usable_key(self.api_key(), placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn config_from(vars: &[(&str, &str)]) -> Result<ChatConfig, ConfigError> {
        ChatConfig::from_lookup(lookup_from(vars))
    }

    #[test]
    fn test_defaults() {
        let config = ChatConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 500);
        assert!(config.sticky_backend_failure);
        assert!(!config.is_backend_configured());
    }

    #[test]
    fn test_placeholder_key_not_configured() {
        let config = config_from(&[("OPENAI_API_KEY", "your_openai_api_key_here")]).unwrap();
        assert!(!config.is_backend_configured());

        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(!config.is_backend_configured());

        let config = config_from(&[("OPENAI_API_KEY", "sk-real")]).unwrap();
        assert!(config.is_backend_configured());
    }

    #[test]
    fn test_key_must_match_provider() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("FOLIO_CHAT_PROVIDER", "anthropic"),
            ("OPENAI_API_KEY", "sk-real"),
        ]))
        .unwrap();
        assert!(!config.is_backend_configured());
        assert_eq!(config.model, CLAUDE_SONNET);
    }

    #[test]
    fn test_temperature_clamped() {
        let config = config_from(&[("FOLIO_CHAT_TEMPERATURE", "1.8")]).unwrap();
        assert_eq!(config.temperature, 1.0);
        let config = config_from(&[("FOLIO_CHAT_TEMPERATURE", "-2")]).unwrap();
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_non_finite_temperature_rejected() {
        for raw in ["NaN", "nan", "inf", "-infinity"] {
            let err = config_from(&[("FOLIO_CHAT_TEMPERATURE", raw)]).unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidValue {
                    key: "FOLIO_CHAT_TEMPERATURE".into(),
                    value: raw.into()
                }
            );
        }
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = config_from(&[("FOLIO_CHAT_MAX_TOKENS", "lots")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "FOLIO_CHAT_MAX_TOKENS".into(),
                value: "lots".into()
            }
        );
        assert!(config_from(&[("FOLIO_CHAT_PROVIDER", "gemini")]).is_err());
        assert!(config_from(&[("FOLIO_CHAT_STICKY_FAILURE", "maybe")]).is_err());
    }

    #[test]
    fn test_flags_and_paths() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("FOLIO_CHAT_STICKY_FAILURE", "off"),
            ("FOLIO_CHAT_TOPIC_MARKERS", "0"),
            ("FOLIO_CHAT_OWNER", " Alex "),
            ("FOLIO_CHAT_CONTENT_PATH", "/srv/portfolio.json"),
            ("FOLIO_CHAT_TIMEOUT_SECS", "12"),
        ]))
        .unwrap();
        assert!(!config.sticky_backend_failure);
        assert!(!config.topic_markers);
        assert_eq!(config.owner_name, "Alex");
        assert_eq!(config.content_path, Some(PathBuf::from("/srv/portfolio.json")));
        assert_eq!(config.request_timeout, Duration::from_secs(12));
    }
}
