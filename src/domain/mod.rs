//! Domain layer for the issue herald
//!
//! Issue and announcement models, the ports implemented by the adapters,
//! and the domain error type.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
