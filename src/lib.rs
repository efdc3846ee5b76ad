//! Configuration loader with file imports and `%parameter%` interpolation.
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;

pub use config::{ConfigLoader, Options, ParameterBag};
pub use error::{ConfigError, ConfigResult};
