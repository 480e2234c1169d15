//! Infrastructure layer module
//!
//! Cross-cutting concerns the adapters and the binary share:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
