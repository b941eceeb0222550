use anyhow::{Context, Result};

use crate::aptitude::sampler::SamplingPolicy;
use crate::embedding::ApiProviderKind;

const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Remote embedding endpoint. `None` selects the local hashing embedder.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_api_provider: ApiProviderKind,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub embedding_max_concurrency: usize,
    pub max_upload_bytes: usize,
    pub tolerate_topic_failures: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let embedding_api_provider = match optional_env("EMBEDDING_API_PROVIDER") {
            Some(raw) => raw
                .parse::<ApiProviderKind>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("EMBEDDING_API_PROVIDER must be 'huggingface' or 'openai'")?,
            None => ApiProviderKind::HuggingFace,
        };

        let embedding_max_concurrency =
            parse_env("EMBEDDING_MAX_CONCURRENCY", 4usize)?.max(1);

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_api_provider,
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?,
            embedding_max_concurrency,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            tolerate_topic_failures: parse_env("APTITUDE_TOLERATE_TOPIC_FAILURES", true)?,
        })
    }

    /// Sampling policy for aptitude paper generation.
    pub fn sampling_policy(&self) -> SamplingPolicy {
        SamplingPolicy {
            tolerate_topic_failures: self.tolerate_topic_failures,
            ..SamplingPolicy::default()
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} is invalid ('{raw}'): {e}")),
        None => Ok(default),
    }
}
