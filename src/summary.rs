//! Dataset summaries - a short natural-language blurb for an upload.
//!
//! The text sent to the model is a flat sample of the first rows. Summaries
//! are best effort: uploads succeed without one.

use crate::config::LlmConfig;
use crate::error::{QaError, Result};
use crate::table::Table;
use async_trait::async_trait;
use itertools::Itertools;
use tracing::{info, warn};

pub const SAMPLE_ROWS: usize = 10;
pub const SAMPLE_MAX_CHARS: usize = 1000;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Every cell of the first `rows` rows, space separated in row-major order,
/// cut to at most `max_chars` characters.
pub fn sample_text(table: &Table, rows: usize, max_chars: usize) -> String {
    let text = (0..table.row_count().min(rows))
        .flat_map(move |row| {
            table
                .columns()
                .iter()
                .map(move |column| column.values()[row].to_string())
        })
        .join(" ");
    text.chars().take(max_chars).collect()
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct LlmSummarizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl LlmSummarizer {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "Summarize the dataset sample in one or two sentences (25-60 words)."},
                {"role": "user", "content": text}
            ],
            "temperature": 0.0,
            "max_tokens": 120,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| QaError::Summarizer(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "summarizer returned an error");
            return Err(QaError::Summarizer(format!("API error ({}): {}", status, error_text)));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| QaError::Summarizer(format!("failed to parse response: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QaError::Summarizer("no content in response".to_string()))?;

        info!(model = %self.model, chars = content.len(), "dataset summarized");
        Ok(content.to_string())
    }
}
