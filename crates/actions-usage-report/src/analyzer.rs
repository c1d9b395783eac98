//! The usage pipeline: parse, aggregate, normalize precision, assemble.

use std::io::Read;
use std::path::Path;

use actions_usage_config::AnalyzerConfig;
use tracing::{debug, info, instrument, warn};

use crate::aggregator::aggregate_all;
use crate::error::{Result, UsageError};
use crate::models::UsageRow;
use crate::parser::UsageParser;
use crate::precision::PrecisionNormalizer;
use crate::report::{Report, ReportAssembler};
use crate::upload::{FileUpload, Outcome, UploadSource};

/// Runs usage exports through the pipeline.
///
/// Holds no state between calls; every call produces an independent report.
#[derive(Debug, Clone, Default)]
pub struct UsageAnalyzer {
    config: AnalyzerConfig,
}

impl UsageAnalyzer {
    /// Create an analyzer with the given configuration.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Summarize rows that were already parsed.
    ///
    /// Fails only when a group total overflows.
    pub fn analyze_rows(&self, rows: &[UsageRow]) -> Result<Report> {
        let normalizer = PrecisionNormalizer::from_rows(rows);
        debug!(decimal_places = normalizer.places(), "Derived cost precision");

        let tables = aggregate_all(rows)?;
        Ok(ReportAssembler::new(normalizer, self.config.repository_separator.clone())
            .assemble(tables))
    }

    /// Parse and summarize an export from a reader.
    pub fn analyze_reader<R: Read>(&self, reader: R) -> Result<Report> {
        let rows = UsageParser::from_config(&self.config).parse_reader(reader)?;
        self.analyze_rows(&rows)
    }

    /// Parse and summarize an export held in memory.
    pub fn analyze_str(&self, data: &str) -> Result<Report> {
        self.analyze_reader(data.as_bytes())
    }

    /// Parse and summarize an export stored on disk.
    pub fn analyze_path(&self, path: &Path) -> Result<Report> {
        let upload = FileUpload::new(path);
        let reader = upload.open().map_err(UsageError::upload_unreadable)?;
        self.analyze_reader(reader)
    }

    /// Validate an upload and analyze it.
    ///
    /// Recoverable problems become [`Outcome::Rejected`] carrying the message
    /// for the uploader. Only fatal errors (a row metered in an unexpected
    /// unit) are returned as `Err`, and no report is produced for them.
    #[instrument(skip_all, fields(upload = %upload.map(|u| u.describe()).unwrap_or_default()))]
    pub fn handle_upload(&self, upload: Option<&dyn UploadSource>) -> Result<Outcome> {
        let Some(upload) = upload else {
            debug!("No upload present");
            return Ok(Outcome::Empty);
        };

        match self.process(upload) {
            Ok(report) => {
                info!(
                    days = report.per_day().len(),
                    users = report.per_user().len(),
                    workflows = report.per_workflow().len(),
                    repositories = report.per_repository().len(),
                    "Analyzed usage upload"
                );
                Ok(Outcome::Success(report))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "Rejected usage upload");
                Ok(Outcome::Rejected(e.friendly_message()))
            }
        }
    }

    fn process(&self, upload: &dyn UploadSource) -> Result<Report> {
        let content_type = upload
            .content_type()
            .ok_or_else(UsageError::upload_missing_metadata)?;

        if !self.config.accepts_content_type(content_type) {
            return Err(UsageError::UnsupportedFormat {
                content_type: content_type.to_string(),
            });
        }

        let reader = upload.open().map_err(UsageError::upload_unreadable)?;
        self.analyze_reader(reader)
    }
}
