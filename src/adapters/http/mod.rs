//! HTTP endpoints exposed by the worker.

pub mod health;

pub use health::HealthServer;
