pub mod analytics;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod schema;
pub mod storage;
pub mod transform;
pub mod writer;

pub use analytics::AnalyticsQuery;
pub use config::{JobConfig, WriteMode};
pub use error::{EtlError, Result};
pub use pipeline::ReviewPipeline;
pub use report::{PipelineReport, QueryReport};
pub use storage::Location;
