//! Process-wide configuration, resolved once at startup.

use crate::client::GeminiModel;

/// Environment variables checked for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Overrides the model identifier.
pub const MODEL_ENV_VAR: &str = "NANOEDIT_MODEL";

/// Overrides the API base URL.
pub const BASE_URL_ENV_VAR: &str = "NANOEDIT_BASE_URL";

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Editor configuration.
///
/// A missing API key does not make construction fail; it is logged once and
/// every edit then fails fast with [`crate::EditError::MissingApiKey`].
#[derive(Clone)]
pub struct Config {
    api_key: Option<String>,
    /// Model used for edits.
    pub model: GeminiModel,
    /// Base URL of the generative language API.
    pub base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates a configuration with no key and default endpoint.
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: GeminiModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        config.api_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());

        if config.api_key.is_none() {
            tracing::error!(
                "API_KEY environment variable not set. The editor will not function correctly."
            );
        }

        if let Some(id) = lookup(MODEL_ENV_VAR) {
            match id.parse::<GeminiModel>() {
                Ok(model) => config.model = model,
                Err(_) => tracing::warn!(
                    model = %id,
                    default = config.model.as_str(),
                    "unknown model in {MODEL_ENV_VAR}, using default"
                ),
            }
        }

        if let Some(url) = lookup(BASE_URL_ENV_VAR).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        config
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured API key, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_key() {
        let config = Config::from_lookup(lookup(&[]));
        assert!(!config.has_api_key());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, GeminiModel::NanoBanana);
    }

    #[test]
    fn test_key_precedence() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "google"),
            ("API_KEY", "primary"),
        ]));
        assert_eq!(config.api_key(), Some("primary"));
    }

    #[test]
    fn test_empty_key_is_absent() {
        let config = Config::from_lookup(lookup(&[("API_KEY", "  "), ("GEMINI_API_KEY", "g")]));
        assert_eq!(config.api_key(), Some("g"));

        let config = Config::new().with_api_key("");
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("API_KEY", "k"),
            (MODEL_ENV_VAR, "nano-banana-pro-preview"),
            (BASE_URL_ENV_VAR, "http://127.0.0.1:9000/"),
        ]));
        assert_eq!(config.model, GeminiModel::NanoBananaPro);
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_unknown_model_keeps_default() {
        let config = Config::from_lookup(lookup(&[(MODEL_ENV_VAR, "dall-e-3")]));
        assert_eq!(config.model, GeminiModel::default());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::new().with_api_key("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
