//! Transformer: the four column rules applied to the raw review table.

use crate::config::JobConfig;
use crate::error::{EtlError, Result};
use crate::schema::{PRODUCT_ID, PRODUCT_ID_UPPER, RATING, REQUIRED_COLUMNS, REVIEW_DATE, REVIEW_TEXT};
use polars::prelude::*;
use tracing::info;

pub struct ReviewTransformer {
    date_format: String,
    missing_review_text: String,
}

impl ReviewTransformer {
    pub fn new(date_format: impl Into<String>, missing_review_text: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
            missing_review_text: missing_review_text.into(),
        }
    }

    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(config.date_format.clone(), config.missing_review_text.clone())
    }

    /// `rating` as a 32-bit integer, 0 when absent or unparseable.
    ///
    /// Text goes through Float64 so `"4.7"` truncates to 4 the way a SQL
    /// cast would; out-of-range and non-finite values become null, then 0.
    pub fn rating_expr() -> Expr {
        col(RATING)
            .cast(DataType::Float64)
            .cast(DataType::Int32)
            .fill_null(lit(0))
            .alias(RATING)
    }

    /// `review_date` parsed with the configured format, null when it does not match
    pub fn review_date_expr(&self) -> Expr {
        col(REVIEW_DATE)
            .cast(DataType::String)
            .str()
            .to_date(StrptimeOptions {
                format: Some(self.date_format.clone().into()),
                strict: false,
                exact: true,
                ..Default::default()
            })
            .alias(REVIEW_DATE)
    }

    pub fn review_text_expr(&self) -> Expr {
        col(REVIEW_TEXT)
            .cast(DataType::String)
            .fill_null(lit(self.missing_review_text.clone()))
            .alias(REVIEW_TEXT)
    }

    /// Null `product_id` stays null
    pub fn product_id_upper_expr() -> Expr {
        col(PRODUCT_ID)
            .cast(DataType::String)
            .str()
            .to_uppercase()
            .alias(PRODUCT_ID_UPPER)
    }

    pub fn check_columns(df: &DataFrame) -> Result<()> {
        let present = df.get_column_names();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !present.contains(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EtlError::MissingColumn(missing.join(", ")))
        }
    }

    /// Apply all four rules. Every other column passes through untouched and
    /// the row count is checked to be unchanged.
    pub fn transform(&self, raw: DataFrame) -> Result<DataFrame> {
        Self::check_columns(&raw)?;
        let expected = raw.height();

        let transformed = raw
            .lazy()
            .with_columns([
                Self::rating_expr(),
                self.review_date_expr(),
                self.review_text_expr(),
                Self::product_id_upper_expr(),
            ])
            .collect()?;

        if transformed.height() != expected {
            return Err(EtlError::RowCountMismatch {
                expected,
                actual: transformed.height(),
            });
        }

        info!("🔧 Transformed {} rows", transformed.height());
        Ok(transformed)
    }
}
