//! Pipeline: Reader -> Transformer -> {processed Writer, Analytics -> Writers}

use crate::analytics::AnalyticsQuery;
use crate::config::JobConfig;
use crate::error::{EtlError, Result};
use crate::reader::ReviewReader;
use crate::report::{PipelineReport, QueryReport};
use crate::storage::Location;
use crate::transform::ReviewTransformer;
use crate::writer::{CsvDatasetWriter, OutputFiles};
use chrono::Utc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

pub struct ReviewPipeline {
    config: JobConfig,
    input: Location,
    processed: Location,
    analytics: Location,
}

impl ReviewPipeline {
    /// Validate the config and resolve its three locations
    pub fn new(config: JobConfig) -> Result<Self> {
        config.validate()?;
        let input = Location::parse(&config.input_path)?;
        let processed = Location::parse(&config.processed_path)?;
        let analytics = Location::parse(&config.analytics_path)?;

        Ok(Self {
            config,
            input,
            processed,
            analytics,
        })
    }

    /// Run once with a fresh run id
    pub fn run(&self) -> Result<PipelineReport> {
        self.run_with_id(Uuid::new_v4().to_string())
    }

    /// Run once; `run_id` is embedded in every part file name
    pub fn run_with_id(&self, run_id: String) -> Result<PipelineReport> {
        let started_at = Utc::now();
        let start = Instant::now();
        info!("🚀 Starting review ETL run {}", run_id);
        info!("   input: {}", self.input);
        info!("   processed: {}", self.processed);
        info!("   analytics: {}", self.analytics);

        let raw = ReviewReader::new(self.config.infer_schema_length).read(&self.input)?;
        let rows_read = raw.frame.height();

        let reviews = ReviewTransformer::from_config(&self.config).transform(raw.frame)?;

        let writer = CsvDatasetWriter::new(run_id.clone(), self.config.write_mode);
        let processed_files = writer.write(
            &reviews,
            &self.processed,
            OutputFiles::EngineDefault {
                rows_per_file: self.config.rows_per_file,
            },
        )?;

        let mut queries = Vec::with_capacity(AnalyticsQuery::ALL.len());
        for query in AnalyticsQuery::ALL {
            let result = query.run(&reviews)?;
            info!("📊 {}: {} row(s)", query, result.height());

            let destination = self.analytics.join(query.name());
            let file = writer
                .write(&result, &destination, OutputFiles::Single)?
                .into_iter()
                .next()
                .ok_or_else(|| EtlError::Write(format!("No file written for {}", query)))?;

            queries.push(QueryReport {
                query,
                rows: result.height(),
                file,
            });
        }

        let report = PipelineReport {
            run_id,
            started_at,
            input_files: raw.files_read,
            rows_read,
            rows_written: reviews.height(),
            processed_files,
            queries,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "✅ Run {} finished in {}ms: {} rows read, {} rows written",
            report.run_id, report.elapsed_ms, report.rows_read, report.rows_written
        );
        Ok(report)
    }
}
