//! Writer: persists a table as header-bearing CSV part files.

use crate::config::WriteMode;
use crate::error::{EtlError, Result};
use crate::storage::{Location, SUCCESS_MARKER};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How many files a table is spread across
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFiles {
    /// Split into parts of at most `rows_per_file` rows
    EngineDefault { rows_per_file: usize },
    /// Coalesce everything into one part
    Single,
}

impl OutputFiles {
    /// `(offset, len)` slices covering `rows`; always at least one
    fn plan(&self, rows: usize) -> Vec<(usize, usize)> {
        match *self {
            OutputFiles::Single => vec![(0, rows)],
            OutputFiles::EngineDefault { rows_per_file } => {
                if rows == 0 {
                    return vec![(0, 0)];
                }
                let size = rows_per_file.max(1);
                (0..rows)
                    .step_by(size)
                    .map(|offset| (offset, size.min(rows - offset)))
                    .collect()
            }
        }
    }
}

pub struct CsvDatasetWriter {
    run_id: String,
    mode: WriteMode,
}

impl CsvDatasetWriter {
    pub fn new(run_id: impl Into<String>, mode: WriteMode) -> Self {
        Self {
            run_id: run_id.into(),
            mode,
        }
    }

    pub fn part_file_name(&self, index: usize) -> String {
        format!("part-{:05}-{}.csv", index, self.run_id)
    }

    /// Write `df` under `destination` and return the part files created.
    ///
    /// Each part is written to a hidden temp file and renamed into place; the
    /// `_SUCCESS` marker is created once every part exists.
    pub fn write(&self, df: &DataFrame, destination: &Location, files: OutputFiles) -> Result<Vec<PathBuf>> {
        let dir = destination.path();
        fs::create_dir_all(dir)
            .map_err(|e| EtlError::Write(format!("Failed to create {}: {}", destination, e)))?;

        if self.mode == WriteMode::Overwrite {
            let removed = clear_destination(dir)?;
            if removed > 0 {
                debug!("Removed {} existing file(s) from {}", removed, destination);
            }
        }

        let mut written = Vec::new();
        for (index, (offset, len)) in files.plan(df.height()).into_iter().enumerate() {
            let mut part = df.slice(offset as i64, len);
            let path = dir.join(self.part_file_name(index));
            write_part(&mut part, &path)?;
            debug!("Wrote {} rows to {}", len, path.display());
            written.push(path);
        }

        File::create(dir.join(SUCCESS_MARKER))
            .map_err(|e| EtlError::Write(format!("Failed to mark {} complete: {}", destination, e)))?;

        info!(
            "💾 Wrote {} rows to {} ({} file(s))",
            df.height(),
            destination,
            written.len()
        );
        Ok(written)
    }
}

fn write_part(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| EtlError::Write(format!("Invalid part path {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file = File::create(&temp_path)
        .map_err(|e| EtlError::Write(format!("Failed to create {}: {}", temp_path.display(), e)))?;
    let written = CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df);
    drop(file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(EtlError::Write(format!("Failed to write {}: {}", path.display(), e)));
    }

    fs::rename(&temp_path, path)
        .map_err(|e| EtlError::Write(format!("Failed to commit {}: {}", path.display(), e)))?;
    Ok(())
}

/// Remove earlier part files and the marker; anything else is left alone
fn clear_destination(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let is_part = name.starts_with("part-") && name.ends_with(".csv");
        if entry.file_type()?.is_file() && (is_part || name == SUCCESS_MARKER) {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}
