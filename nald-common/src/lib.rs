//! # NALD Import Common Library
//!
//! Shared code for the NALD licence import service:
//! - Error types and transient/terminal classification
//! - Event types (ImportEvent enum) and EventBus
//! - Configuration loading
//! - NALD date parsing helpers

pub mod config;
pub mod dates;
pub mod error;
pub mod events;

pub use config::ImportConfig;
pub use error::{Error, Result};
