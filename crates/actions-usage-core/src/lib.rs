//! # actions-usage-core
//!
//! Core errors and utilities shared by the actions-usage crates.
//!
//! This crate provides:
//! - [`CoreError`] - Error types for configuration and logging
//! - [`logging`] - Tracing setup
//!
//! ## Example
//!
//! ```no_run
//! use actions_usage_core::logging;
//!
//! fn main() -> actions_usage_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{CoreError, Result};
pub use logging::{LogGuard, init_logging, init_test_logging};
