//! Runtime configuration, read from environment variables (a `.env` file is
//! loaded by the binary first).

use crate::error::{QaError, Result};
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub max_body_bytes: usize,
    pub query_log_path: Option<PathBuf>,
    /// Summaries are disabled when absent
    pub llm: Option<LlmConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            query_log_path: None,
            llm: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_body_bytes = match get("TABULAR_QA_MAX_BODY_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                QaError::Config(format!("TABULAR_QA_MAX_BODY_BYTES must be a byte count, got '{}'", raw))
            })?,
            None => defaults.max_body_bytes,
        };

        let llm = get("OPENAI_API_KEY").map(|api_key| LlmConfig {
            api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
        });

        Ok(Self {
            bind_addr: get("TABULAR_QA_BIND").unwrap_or(defaults.bind_addr),
            upload_dir: get("TABULAR_QA_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_body_bytes,
            query_log_path: get("TABULAR_QA_QUERY_LOG").map(PathBuf::from),
            llm,
        })
    }
}
