use std::{env, time::Duration};

use domain::consultations::ModelNames;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const WHISPER_API_URL: &str =
    "https://api-inference.huggingface.co/models/openai/whisper-large-v3";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    /// Process-local maps, for local runs
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub huggingface_api_key: Option<String>,
    pub whisper_url: String,
    pub models: ModelNames,
    pub store: StoreBackend,
    pub http_timeout: Duration,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or(default.to_string());
        let secret = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let defaults = ModelNames::default();

        let store = match var("STORE_BACKEND", "dynamodb").to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::DynamoDb,
        };

        let http_timeout = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|secs| secs.parse().ok())
            .unwrap_or(120);

        Self {
            gemini_api_key: secret("GEMINI_API_KEY"),
            gemini_base_url: var("GEMINI_BASE_URL", GEMINI_BASE_URL),
            huggingface_api_key: secret("HUGGINGFACE_API_KEY"),
            whisper_url: var("WHISPER_API_URL", WHISPER_API_URL),
            models: ModelNames {
                extraction: var("GEMINI_EXTRACTION_MODEL", &defaults.extraction),
                enrichment: var("GEMINI_ENRICHMENT_MODEL", &defaults.enrichment),
                polish: var("GEMINI_POLISH_MODEL", &defaults.polish),
                translation: var("GEMINI_TRANSLATION_MODEL", &defaults.translation),
            },
            store,
            http_timeout: Duration::from_secs(http_timeout),
            bind_addr: var("BIND_ADDR", "0.0.0.0:3000"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config.store, StoreBackend::DynamoDb);
        assert_eq!(config.http_timeout, Duration::from_secs(120));
        assert_eq!(config.models, ModelNames::default());
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("STORE_BACKEND", "Memory"),
            ("HTTP_TIMEOUT_SECS", "30"),
            ("GEMINI_API_KEY", "key"),
            ("HUGGINGFACE_API_KEY", "  "),
            ("GEMINI_POLISH_MODEL", "gemini-pro"),
        ]);
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.gemini_api_key.as_deref(), Some("key"));
        assert!(config.huggingface_api_key.is_none());
        assert_eq!(config.models.polish, "gemini-pro");
    }
}
