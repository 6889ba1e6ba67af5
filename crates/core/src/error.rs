use crate::status::CommandStatus;

/// Invalid or missing input, detected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("No valid instance IDs provided.")]
    NoTargets,

    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error("Invalid value for input '{name}': {value}")]
    InvalidInput { name: String, value: String },
}

/// Failure talking to the remote command service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a service response (network, DNS,
    /// credentials, throttling exhausted, ...).
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a modelled error.
    #[error("Service error ({code}): {message}")]
    Service { code: String, message: String },
}

/// Dispatch of the command to the batch failed. Fatal for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("Error sending command: {0}")]
    Transport(#[from] TransportError),

    #[error("missing invocation id")]
    MissingInvocationId,
}

/// Polling one target failed. Scoped to that target only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("Polling timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("Error during polling: {0}")]
    Query(#[from] TransportError),

    /// The poller task ended without producing an outcome (panic).
    #[error("Poller aborted: {0}")]
    Aborted(String),
}

/// Representative reason a batch verdict is not ok.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerdictError {
    #[error("instance {target_id}: {error}")]
    Poll { target_id: String, error: PollError },

    #[error("Command failed with status: {status} (instance {target_id})")]
    Status {
        target_id: String,
        status: CommandStatus,
    },
}
