//! Client layer for the remote command-execution service.
//!
//! [`service::CommandService`] is the seam the engine depends on: one
//! operation to send a command to a batch of targets and one to query a
//! single target's invocation. [`aws::SsmCommandService`] implements it
//! on top of AWS Systems Manager Run Command.

pub mod aws;
pub mod service;
