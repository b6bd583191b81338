use crate::error::ModelInitError;
use std::env;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "google/flan-t5-base";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Maximum output length requested from the fallback model.
pub const FALLBACK_MAX_LENGTH: usize = 150;

const MODE_ENV: &str = "MEDCHAT_GENERATION_MODE";
const MODEL_ENV: &str = "MEDCHAT_MODEL";
const URL_ENV: &str = "MEDCHAT_INFERENCE_URL";
const TOKEN_ENV: &str = "MEDCHAT_API_TOKEN";
const HF_TOKEN_ENV: &str = "HF_TOKEN";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenerationMode {
    Hosted,
    Stub,
}

impl GenerationMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hosted => "hosted",
            Self::Stub => "stub",
        }
    }
}

impl FromStr for GenerationMode {
    type Err = ModelInitError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hosted" => Ok(Self::Hosted),
            "stub" => Ok(Self::Stub),
            other => Err(ModelInitError::UnsupportedMode(other.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub mode: GenerationMode,
    pub model: String,
    pub endpoint: String,
    pub api_token: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Hosted,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_INFERENCE_URL.to_string(),
            api_token: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Result<Self, ModelInitError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ModelInitError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(mode) = non_empty(MODE_ENV) {
            config.mode = mode.parse()?;
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            config.model = model.trim().to_string();
        }
        if let Some(url) = non_empty(URL_ENV) {
            config.endpoint = url.trim().to_string();
        }
        config.api_token = non_empty(TOKEN_ENV)
            .or_else(|| non_empty(HF_TOKEN_ENV))
            .map(|t| t.trim().to_string());
        Ok(config)
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = GeneratorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.mode, GenerationMode::Hosted);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_INFERENCE_URL);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn env_overrides_and_token_fallback() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("MEDCHAT_GENERATION_MODE", "STUB"),
            ("MEDCHAT_MODEL", " google/flan-t5-small "),
            ("HF_TOKEN", "hf_abc"),
        ]))
        .unwrap();
        assert_eq!(config.mode, GenerationMode::Stub);
        assert_eq!(config.model, "google/flan-t5-small");
        assert_eq!(config.api_token.as_deref(), Some("hf_abc"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = GeneratorConfig::from_lookup(lookup(&[("MEDCHAT_GENERATION_MODE", "onnx")]))
            .unwrap_err();
        assert!(matches!(err, ModelInitError::UnsupportedMode(mode) if mode == "onnx"));
    }
}
