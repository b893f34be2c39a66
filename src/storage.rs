//! Storage locations.
//!
//! Locations are URIs. `file://` URIs and plain paths resolve to the local
//! filesystem; remote object stores are expected to be mounted and addressed
//! by path.

use crate::error::{EtlError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Name of the empty marker written once a destination is complete
pub const SUCCESS_MARKER: &str = "_SUCCESS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: PathBuf,
}

impl Location {
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(EtlError::Storage("Empty storage location".to_string()));
        }

        match uri.split_once("://") {
            Some(("file", rest)) => Ok(Self::local(rest)),
            Some((scheme, _)) => Err(EtlError::Storage(format!(
                "Unsupported storage scheme '{}' in {}: mount the bucket and pass a local path",
                scheme, uri
            ))),
            None => Ok(Self::local(uri)),
        }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sub-location, e.g. `analytics.join("top_customers")`
    pub fn join(&self, child: &str) -> Self {
        Self::local(self.path.join(child.trim_matches('/')))
    }

    /// Every CSV file under this location, recursively, in path order.
    ///
    /// Names starting with `_` or `.` are skipped at any depth, which keeps
    /// commit markers and in-flight temp files out of the input.
    pub fn list_csv_files(&self) -> Result<Vec<PathBuf>> {
        if !self.path.exists() {
            return Err(EtlError::NoInputFiles(self.to_string()));
        }

        if self.path.is_file() {
            return if is_csv(&self.path) {
                Ok(vec![self.path.clone()])
            } else {
                Err(EtlError::NoInputFiles(self.to_string()))
            };
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry
                .map_err(|e| EtlError::Storage(format!("Failed to list {}: {}", self, e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if is_csv(entry.path()) {
                files.push(entry.into_path());
            } else {
                debug!("Ignoring non-CSV file {}", entry.path().display());
            }
        }

        Ok(files)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || name.starts_with('_'))
        .unwrap_or(false)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
