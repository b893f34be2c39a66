//! Reader: loads every CSV file under the landing location into one table.

use crate::error::{EtlError, Result};
use crate::storage::Location;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Combined raw table plus the files that contributed to it
#[derive(Debug)]
pub struct ReadOutcome {
    pub frame: DataFrame,
    pub files_read: Vec<PathBuf>,
}

pub struct ReviewReader {
    infer_schema_length: Option<usize>,
}

impl ReviewReader {
    pub fn new(infer_schema_length: Option<usize>) -> Self {
        Self { infer_schema_length }
    }

    /// Read all CSV files under `location`.
    ///
    /// Columns are the union of every file's header, in order of first
    /// appearance; a column a file lacks is null for that file's rows. Any
    /// file that fails to parse fails the whole read.
    pub fn read(&self, location: &Location) -> Result<ReadOutcome> {
        let files = location.list_csv_files()?;
        if files.is_empty() {
            return Err(EtlError::NoInputFiles(location.to_string()));
        }
        info!("📂 Found {} input file(s) under {}", files.len(), location);

        let mut frames = Vec::with_capacity(files.len());
        for file in &files {
            let df = self.read_file(file)?;
            debug!("Read {} rows from {}", df.height(), file.display());
            frames.push(df.lazy());
        }

        let frame = concat_lf_diagonal(
            frames,
            UnionArgs {
                to_supertypes: true,
                ..Default::default()
            },
        )?
        .collect()?;

        info!(
            "Loaded {} rows x {} columns from {} file(s)",
            frame.height(),
            frame.width(),
            files.len()
        );
        debug!("Inferred schema: {:?}", frame.schema());

        Ok(ReadOutcome {
            frame,
            files_read: files,
        })
    }

    fn read_file(&self, path: &Path) -> Result<DataFrame> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_encoding(CsvEncoding::LossyUtf8)
            .with_missing_is_null(true)
            .with_truncate_ragged_lines(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| EtlError::Read(format!("Failed to read {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_dir(dir: &Path) -> Result<ReadOutcome> {
        ReviewReader::new(Some(1000)).read(&Location::local(dir))
    }

    #[test]
    fn test_union_of_headers_across_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "product_id,rating\np1,5\np2,4\n").unwrap();
        fs::write(dir.path().join("b.csv"), "rating,product_id,channel\n3,p3,web\n").unwrap();

        let outcome = read_dir(dir.path()).unwrap();
        let df = outcome.frame;

        assert_eq!(outcome.files_read.len(), 2);
        assert_eq!(df.height(), 3);
        assert_eq!(df.get_column_names(), vec!["product_id", "rating", "channel"]);
        assert_eq!(df.column("rating").unwrap().dtype(), &DataType::Int64);

        let channel = df.column("channel").unwrap().str().unwrap();
        assert_eq!(channel.get(0), None);
        assert_eq!(channel.get(2), Some("web"));
        assert_eq!(df.column("product_id").unwrap().str().unwrap().get(2), Some("p3"));
    }

    #[test]
    fn test_conflicting_types_widen_to_text() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "product_id,rating\np1,5\n").unwrap();
        fs::write(dir.path().join("b.csv"), "product_id,rating\np2,bad\n").unwrap();

        let df = read_dir(dir.path()).unwrap().frame;
        let rating = df.column("rating").unwrap();
        assert_eq!(rating.dtype(), &DataType::String);
        assert_eq!(rating.str().unwrap().get(0), Some("5"));
        assert_eq!(rating.str().unwrap().get(1), Some("bad"));
    }

    #[test]
    fn test_blank_cell_is_null_and_short_row_is_padded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("reviews.csv"),
            "product_id,review_text\nabc1,great\nabc2,\nabc3\n",
        )
        .unwrap();

        let df = read_dir(dir.path()).unwrap().frame;
        let text = df.column("review_text").unwrap().str().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(text.get(0), Some("great"));
        assert_eq!(text.get(1), None);
        assert_eq!(text.get(2), None);
    }

    #[test]
    fn test_invalid_utf8_keeps_every_row() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "product_id,review_text\np1,fine\n").unwrap();
        fs::write(
            dir.path().join("b.csv"),
            b"product_id,review_text\np2,caf\xe9\np3,ok\np4,good\n".as_slice(),
        )
        .unwrap();

        let outcome = read_dir(dir.path()).unwrap();
        let df = outcome.frame;
        assert_eq!(outcome.files_read.len(), 2);
        assert_eq!(df.height(), 4);

        let text = df.column("review_text").unwrap().str().unwrap();
        assert!(text.get(1).unwrap().starts_with("caf"));
        assert_eq!(text.get(3), Some("good"));
    }

    #[test]
    fn test_unparseable_file_fails_the_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.csv"), "product_id\np1\n").unwrap();
        fs::write(dir.path().join("empty.csv"), "").unwrap();

        let err = read_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EtlError::Read(_)));
        assert!(err.to_string().contains("empty.csv"));
    }

    #[test]
    fn test_empty_landing_zone_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_SUCCESS"), "").unwrap();

        let err = read_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EtlError::NoInputFiles(_)));
    }
}
