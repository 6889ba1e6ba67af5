//! Final, host-facing summary of one run.

use ssm_run_core::error::{ConfigError, SendError, VerdictError};
use ssm_run_core::result::BatchResult;

/// Parameters of one run, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub command: String,
    pub target_ids: Vec<String>,
    pub working_dir: String,
}

/// Overall run status as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunFailure {
    /// Rejected before anything was sent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The send itself failed; no target was polled.
    #[error(transparent)]
    Send(#[from] SendError),

    /// Every target was polled and at least one did not succeed.
    #[error(transparent)]
    Verdict(#[from] VerdictError),
}

/// Everything the host needs to publish once a run is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    target_ids: Vec<String>,
    /// Per-target outcomes. Present whenever pollers ran, whatever the verdict.
    pub response: Option<BatchResult>,
    pub failure: Option<RunFailure>,
}

impl RunReport {
    /// Report for a run whose inputs were rejected before it started.
    pub fn rejected(error: ConfigError) -> Self {
        Self::failed(Vec::new(), None, error)
    }

    pub(crate) fn success(target_ids: Vec<String>, response: BatchResult) -> Self {
        Self {
            target_ids,
            response: Some(response),
            failure: None,
        }
    }

    pub(crate) fn failed(
        target_ids: Vec<String>,
        response: Option<BatchResult>,
        failure: impl Into<RunFailure>,
    ) -> Self {
        Self {
            target_ids,
            response,
            failure: Some(failure.into()),
        }
    }

    pub fn status(&self) -> RunStatus {
        if self.failure.is_some() {
            RunStatus::Failure
        } else {
            RunStatus::Success
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Short error text for the `error` output.
    pub fn error(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }

    /// Human-readable message attached to the failed-process signal.
    pub fn failure_message(&self) -> Option<String> {
        let failure = self.failure.as_ref()?;
        let message = match failure {
            RunFailure::Config(e) => e.to_string(),
            RunFailure::Send(e) => format!("An unexpected error occurred: {e}"),
            RunFailure::Verdict(e) => format!(
                "Errors occurred running the command on instance IDs [{}]: {e}",
                self.target_ids.join(", ")
            ),
        };
        Some(message)
    }
}
