//! # actions-usage-report
//!
//! Summaries of GitHub Actions usage-billing exports.
//!
//! This crate provides:
//! - [`UsageParser`] - Read export rows, keeping only the analyzed product
//! - [`group_and_sum`] - Fold rows into per-key minute and cost totals
//! - [`PrecisionNormalizer`] - Render every cost with the same decimal width
//! - [`ReportAssembler`] - Build the four summary tables of a [`Report`]
//! - [`UsageAnalyzer`] - The whole pipeline, plus upload validation
//!
//! ## Report Tables
//!
//! - Per Day, Per User, Per Workflow: minutes, cost and the repositories involved
//! - Per Repository: minutes and cost
//!
//! ## Example
//!
//! ```no_run
//! use actions_usage_report::{FileUpload, Outcome, UsageAnalyzer};
//!
//! fn main() -> anyhow::Result<()> {
//!     let analyzer = UsageAnalyzer::default();
//!     let upload = FileUpload::new("usage.csv").with_content_type("text/csv");
//!
//!     match analyzer.handle_upload(Some(&upload))? {
//!         Outcome::Empty => println!("Nothing uploaded"),
//!         Outcome::Rejected(message) => eprintln!("{message}"),
//!         Outcome::Success(report) => {
//!             for row in report.per_user().rows() {
//!                 println!("{}: {} minutes, ${}", row.group, row.minutes, row.cost);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod error;
pub mod models;
pub mod parser;
pub mod precision;
pub mod report;
pub mod upload;

// Re-export main types
pub use aggregator::{GroupTable, aggregate, aggregate_all, group_and_sum};
pub use analyzer::UsageAnalyzer;
pub use error::{Result, UsageError};
pub use models::{Bucket, Dimension, UsageRow};
pub use parser::{FIELD_MAPPING, Field, HeaderLookup, UsageParser};
pub use precision::PrecisionNormalizer;
pub use report::{Report, ReportAssembler, ReportTable, SummaryRow};
pub use upload::{FileUpload, MemoryUpload, Outcome, UploadSource};
