//! Run report emitted at the end of every pipeline run.

use crate::analytics::AnalyticsQuery;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    pub query: AnalyticsQuery,
    pub rows: usize,
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,

    /// Files that contributed rows
    pub input_files: Vec<PathBuf>,


    pub rows_read: usize,
    pub rows_written: usize,
    pub processed_files: Vec<PathBuf>,
    pub queries: Vec<QueryReport>,
    pub elapsed_ms: u64,
}

impl PipelineReport {
    pub fn query(&self, query: AnalyticsQuery) -> Option<&QueryReport> {
        self.queries.iter().find(|q| q.query == query)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
