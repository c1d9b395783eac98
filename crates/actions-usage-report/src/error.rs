//! Error types for the usage pipeline.

use thiserror::Error;

/// Usage analysis errors.
///
/// Every variant except [`UsageError::UnexpectedUnitType`] is recoverable and
/// carries a message meant for the person who uploaded the file.
#[derive(Error, Debug)]
pub enum UsageError {
    /// Upload metadata is absent or the uploaded file cannot be read
    #[error("{message}")]
    UploadTransport {
        /// Human-readable message
        message: String,
        /// Underlying I/O failure, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// Declared content type is not CSV
    #[error("You must upload a file in the CSV format.")]
    UnsupportedFormat {
        /// The declared content type
        content_type: String,
    },

    /// Header row lacks required labels
    #[error("Malformed CSV file, missing header fields: {}", missing.join(", "))]
    MissingHeaders {
        /// Missing labels in canonical order
        missing: Vec<String>,
    },

    /// Quantity times unit price of a row exceeds the decimal range
    #[error("Malformed CSV file, the cost on line {line} is out of range")]
    CostOutOfRange {
        /// 1-based line number in the input
        line: u64,
    },

    /// Minutes or cost summed for one group exceed their numeric range
    #[error("Usage totals for '{group}' are out of range")]
    TotalOutOfRange {
        /// Group key whose bucket overflowed
        group: String,
    },

    /// The CSV reader rejected the input (bad UTF-8, I/O failure, ...)
    #[error("Malformed CSV file: {0}")]
    Csv(#[from] csv::Error),

    /// A row is metered in something other than minutes
    #[error("Unexpected unit type '{unit_type}' on line {line}")]
    UnexpectedUnitType {
        /// The unit type found in the row
        unit_type: String,
        /// 1-based line number in the input
        line: u64,
    },
}

impl UsageError {
    /// Upload metadata was missing.
    pub fn upload_missing_metadata() -> Self {
        Self::UploadTransport {
            message: "There was an error uploading the files.".to_string(),
            source: None,
        }
    }

    /// The uploaded file could not be opened.
    pub fn upload_unreadable(source: std::io::Error) -> Self {
        Self::UploadTransport {
            message: "Could not open uploaded file.".to_string(),
            source: Some(source),
        }
    }

    /// Check if this error violates a data assumption and must abort the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UsageError::UnexpectedUnitType { .. })
    }

    /// Check if this error stems from the file content rather than the upload.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            UsageError::MissingHeaders { .. }
                | UsageError::CostOutOfRange { .. }
                | UsageError::TotalOutOfRange { .. }
                | UsageError::Csv(_)
        )
    }

    /// Create a user-friendly message for this error.
    pub fn friendly_message(&self) -> String {
        match self {
            UsageError::Csv(e) => match e.kind() {
                csv::ErrorKind::Utf8 { .. } => {
                    "Malformed CSV file, the file is not valid UTF-8".to_string()
                }
                _ => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

/// Result type for usage analysis operations.
pub type Result<T> = std::result::Result<T, UsageError>;
