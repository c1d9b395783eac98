//! # actions-usage-config
//!
//! Settings for the usage analyzer. The defaults describe a GitHub Actions
//! billing export: only `Actions` rows are kept, quantities are metered in
//! minutes, and uploads must be declared as `text/csv`.
//!
//! ## Example
//!
//! ```no_run
//! use actions_usage_config::AnalyzerConfig;
//!
//! let config = AnalyzerConfig::from_yaml(std::path::Path::new("actions-usage.yaml"))
//!     .unwrap_or_default();
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;

use actions_usage_core::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Product line kept by the row filter.
pub const DEFAULT_PRODUCT: &str = "Actions";

/// The only unit type the aggregation understands.
pub const DEFAULT_UNIT_TYPE: &str = "minute";

/// Declared content type an upload must carry.
pub const DEFAULT_CONTENT_TYPE: &str = "text/csv";

/// Separator used when joining repository names in summary rows.
pub const DEFAULT_REPOSITORY_SEPARATOR: &str = ", ";

/// Analyzer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Value of the `Product` column a row must carry to be analyzed
    pub product: String,

    /// Value of the `Unit Type` column every analyzed row must carry
    pub unit_type: String,

    /// Content type an upload must declare (parameters are ignored)
    pub content_type: String,

    /// Separator for the joined repository list
    pub repository_separator: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT.to_string(),
            unit_type: DEFAULT_UNIT_TYPE.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            repository_separator: DEFAULT_REPOSITORY_SEPARATOR.to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the product filter.
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    /// Set the accepted unit type.
    pub fn with_unit_type(mut self, unit_type: impl Into<String>) -> Self {
        self.unit_type = unit_type.into();
        self
    }

    /// Set the accepted content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the repository separator.
    pub fn with_repository_separator(mut self, separator: impl Into<String>) -> Self {
        self.repository_separator = separator.into();
        self
    }

    /// Check whether a declared content type matches the accepted one.
    ///
    /// Media type parameters (`; charset=utf-8`) and letter case are ignored.
    pub fn accepts_content_type(&self, declared: &str) -> bool {
        let essence = declared.split(';').next().unwrap_or_default().trim();
        essence.eq_ignore_ascii_case(self.content_type.trim())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.product.trim().is_empty() {
            return Err(CoreError::validation("product must not be empty"));
        }
        if self.unit_type.trim().is_empty() {
            return Err(CoreError::validation("unit_type must not be empty"));
        }
        if !self.content_type.contains('/') {
            return Err(CoreError::validation(format!(
                "content_type '{}' is not a media type",
                self.content_type
            )));
        }
        if self.repository_separator.is_empty() {
            return Err(CoreError::validation(
                "repository_separator must not be empty",
            ));
        }
        Ok(())
    }

    /// Load configuration from a YAML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::ConfigNotFound {
            path: path.to_path_buf(),
            source: Some(e),
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded analyzer config");
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| CoreError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| CoreError::Io {
            operation: "writing config".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}
