use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 8000;

/// Variables that must be set and non-empty before the server starts.
pub const REQUIRED_VARS: [&str; 3] = ["QDRANT_API_KEY", "QDRANT_URL", "COHERE_API_KEY"];

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub embed_model: String,
    pub chat_model: String,
    pub max_answer_tokens: usize,
    pub answer_temperature: f32,
    pub retrieval_limit: usize,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub qdrant_url: String,
    pub qdrant_api_key: String,
    pub qdrant_collection: String,
    pub cohere_base_url: String,
    pub cohere_api_key: String,
    pub models: ModelConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&env_snapshot())
    }

    /// Builds the configuration from an explicit environment snapshot so
    /// tests never have to mutate the real process environment.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        Ok(Self {
            port: resolve_port(vars)?,
            qdrant_url: required(vars, "QDRANT_URL")?,
            qdrant_api_key: required(vars, "QDRANT_API_KEY")?,
            qdrant_collection: vars
                .get("QDRANT_COLLECTION")
                .cloned()
                .unwrap_or_else(|| "book_knowledge_base".to_string()),
            cohere_base_url: vars
                .get("COHERE_BASE_URL")
                .cloned()
                .unwrap_or_else(|| "https://api.cohere.ai".to_string()),
            cohere_api_key: required(vars, "COHERE_API_KEY")?,
            models: ModelConfig {
                embed_model: vars
                    .get("EMBED_MODEL")
                    .cloned()
                    .unwrap_or_else(|| "embed-multilingual-v3.0".to_string()),
                chat_model: vars
                    .get("CHAT_MODEL")
                    .cloned()
                    .unwrap_or_else(|| "command-r-08-2024".to_string()),
                max_answer_tokens: vars
                    .get("MAX_ANSWER_TOKENS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
                answer_temperature: vars
                    .get("ANSWER_TEMPERATURE")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.3),
                retrieval_limit: vars
                    .get("RETRIEVAL_LIMIT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
        })
    }
}

pub fn env_snapshot() -> HashMap<String, String> {
    env::vars().collect()
}

/// Reads `PORT`, defaulting to 8000. A set but non-numeric value is a
/// startup error that aborts before the server binds.
pub fn resolve_port(vars: &HashMap<String, String>) -> Result<u16> {
    match vars.get("PORT") {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .parse()
            .with_context(|| format!("PORT is not a valid port number: {raw:?}")),
    }
}

pub fn missing_required_vars(vars: &HashMap<String, String>) -> Vec<&'static str> {
    REQUIRED_VARS
        .iter()
        .copied()
        .filter(|name| {
            vars.get(*name)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .collect()
}

/// Returns true iff every required variable is set and non-empty,
/// logging the outcome either way.
pub fn check_environment(vars: &HashMap<String, String>) -> bool {
    let missing = missing_required_vars(vars);
    if missing.is_empty() {
        tracing::info!("all required environment variables are set");
        true
    } else {
        tracing::error!(
            "missing required environment variables: {}",
            missing.join(", ")
        );
        false
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String> {
    vars.get(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .with_context(|| format!("required environment variable {name} is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        [
            ("QDRANT_API_KEY", "qk"),
            ("QDRANT_URL", "http://localhost:6333"),
            ("COHERE_API_KEY", "ck"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn port_defaults_to_8000() {
        assert_eq!(resolve_port(&base_vars()).unwrap(), 8000);
    }

    #[test]
    fn port_honors_explicit_value() {
        let mut vars = base_vars();
        vars.insert("PORT".to_string(), "9090".to_string());
        assert_eq!(resolve_port(&vars).unwrap(), 9090);
    }

    #[test]
    fn non_numeric_port_is_a_startup_error() {
        let mut vars = base_vars();
        vars.insert("PORT".to_string(), "abc".to_string());
        assert!(resolve_port(&vars).is_err());
        assert!(AppConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn missing_key_fails_environment_check() {
        let mut vars = base_vars();
        vars.remove("QDRANT_API_KEY");
        assert!(!check_environment(&vars));
        assert_eq!(missing_required_vars(&vars), vec!["QDRANT_API_KEY"]);
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = base_vars();
        vars.insert("COHERE_API_KEY".to_string(), "  ".to_string());
        assert_eq!(missing_required_vars(&vars), vec!["COHERE_API_KEY"]);
    }

    #[test]
    fn complete_environment_passes_check() {
        assert!(check_environment(&base_vars()));
        assert!(missing_required_vars(&base_vars()).is_empty());
    }

    #[test]
    fn config_uses_ask_pipeline_defaults() {
        let config = AppConfig::from_vars(&base_vars()).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.qdrant_collection, "book_knowledge_base");
        assert_eq!(config.models.embed_model, "embed-multilingual-v3.0");
        assert_eq!(config.models.chat_model, "command-r-08-2024");
        assert_eq!(config.models.max_answer_tokens, 500);
        assert_eq!(config.models.retrieval_limit, 5);
    }
}
