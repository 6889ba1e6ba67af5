//! `ssm-run` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod aws;
pub mod config;
pub mod output;
pub mod telemetry;
