//! Upload boundary: what the analyzer needs from a received file.
//!
//! Transport layers (a multipart form handler, a CLI argument, a test) wrap
//! the received file in an [`UploadSource`]. The analyzer only reads the
//! declared content type and opens the content once.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::report::Report;

/// A received file.
pub trait UploadSource {
    /// Content type declared by the sender, if the transport supplied one.
    fn content_type(&self) -> Option<&str>;

    /// Open the content for reading.
    ///
    /// The returned reader is dropped by the caller as soon as parsing ends,
    /// successfully or not.
    fn open(&self) -> std::io::Result<Box<dyn Read + '_>>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String {
        "upload".to_string()
    }
}

/// An upload stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    path: PathBuf,
    content_type: Option<String>,
}

impl FileUpload {
    /// Create an upload for a file without declared content type.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_type: None,
        }
    }

    /// Set the declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Location of the uploaded file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UploadSource for FileUpload {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An upload held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUpload {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl MemoryUpload {
    /// Create an in-memory upload without declared content type.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Set the declared content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl UploadSource for MemoryUpload {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }

    fn describe(&self) -> String {
        format!("{} bytes in memory", self.bytes.len())
    }
}

/// Result of handling one upload, as shown to the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was uploaded; show the empty form.
    Empty,
    /// The upload was refused; show the diagnostic.
    Rejected(String),
    /// The upload was analyzed.
    Success(Report),
}

impl Outcome {
    /// The report, if the upload was analyzed.
    pub fn report(&self) -> Option<&Report> {
        match self {
            Outcome::Success(report) => Some(report),
            _ => None,
        }
    }

    /// The diagnostic, if the upload was refused.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Outcome::Rejected(message) => Some(message),
            _ => None,
        }
    }
}
