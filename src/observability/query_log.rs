//! Query Logger
//!
//! Structured record of every resolved query: kept in a bounded in-memory
//! buffer and optionally appended to a JSON-lines file.

use crate::error::{QaError, Result};
use crate::resolver::{Intent, QueryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

/// Query execution log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub timestamp: DateTime<Utc>,
    pub query_id: String,
    pub query: String,
    pub intent: Option<Intent>,
    pub answer: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl QueryLogEntry {
    pub fn from_result(result: &QueryResult, elapsed_ms: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            query_id: Uuid::new_v4().to_string(),
            query: result.query.clone(),
            intent: result.intent,
            answer: (!result.answer.is_empty()).then(|| result.answer.clone()),
            success: !result.is_failure(),
            error: result.error.clone(),
            elapsed_ms,
        }
    }
}

pub struct QueryLog {
    log_file: Option<PathBuf>,
    entries: Mutex<VecDeque<QueryLogEntry>>,
    max_in_memory: usize,
}

impl QueryLog {
    pub fn new(log_file: Option<PathBuf>, max_in_memory: usize) -> Self {
        Self {
            log_file,
            entries: Mutex::new(VecDeque::new()),
            max_in_memory,
        }
    }

    /// Record an entry
    pub fn record(&self, entry: QueryLogEntry) -> Result<()> {
        {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| QaError::Storage("query log lock poisoned".to_string()))?;
            entries.push_back(entry.clone());
            while entries.len() > self.max_in_memory {
                entries.pop_front();
            }
        }

        if let Some(ref log_file) = self.log_file {
            let mut file = OpenOptions::new().create(true).append(true).open(log_file)?;
            writeln!(file, "{}", serde_json::to_string(&entry)?)?;
        }

        Ok(())
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<QueryLogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().rev().take(limit).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::new(None, 1000)
    }
}
