//! Domain types for dispatching one shell command to a fleet of targets.
//!
//! Everything here is pure (no I/O, no async) so the engine and the
//! action binary can share one vocabulary: execution [`status`] values,
//! per-target [`result`] records, the batch map with its verdict, the
//! [`error`] taxonomy, and [`targets`] input parsing.

pub mod error;
pub mod result;
pub mod status;
pub mod targets;
