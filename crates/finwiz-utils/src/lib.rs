//! Shared utilities for FinWiz
//!
//! Logging setup, `.env` loading and the [`Settings`] aggregate the CLI
//! builds everything else from.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{DEFAULT_MODEL, Settings, load_env};
pub use error::{Result, UtilsError};
pub use logging::{LogConfig, LogFormat, init_tracing};
