//! Dispatch-and-poll orchestration.
//!
//! A run sends one command to every target ([`dispatcher`]), polls each
//! target's invocation concurrently until it settles ([`poller`]), and
//! reduces the per-target outcomes to one verdict ([`batch`]). The
//! [`report`] module turns that into the single value the host writes
//! out once the run is over.

pub mod batch;
pub mod dispatcher;
pub mod poller;
pub mod report;
