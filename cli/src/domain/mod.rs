//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `reqwest`, or `std::fs`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod options;
pub mod scan;

pub use config::{ScangateConfig, mask_token, validate_config_key, validate_config_value};
pub use error::{ApiError, ConfigError, ScanInputError};
pub use options::{LocalOptions, ScanFlags, translate};
pub use scan::{PollPolicy, ScanEvent, ScanOutcome, StopReason, build_request};
