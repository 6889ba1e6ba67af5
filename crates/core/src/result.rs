//! Per-target result records, the batch map, and its verdict.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{PollError, VerdictError};
use crate::status::CommandStatus;

/// Identifier the service assigns to one sent command.
///
/// Covers every target in the batch; the pair (invocation, target)
/// addresses a single execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandInvocation(String);

impl CommandInvocation {
    pub fn new(command_id: impl Into<String>) -> Self {
        Self(command_id.into())
    }

    pub fn command_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal result of the command on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub status: CommandStatus,
    /// Inline stdout. The service truncates large output and may omit it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    /// Location of the full stdout in external storage, when the service
    /// wrote it there. Not fetched; surfaced for the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_url: Option<String>,
}

impl CommandResult {
    pub fn new(status: CommandStatus) -> Self {
        Self {
            status,
            stdout: None,
            stderr: None,
            stdout_url: None,
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn with_stdout_url(mut self, url: impl Into<String>) -> Self {
        self.stdout_url = Some(url.into());
        self
    }

    /// True when neither inline stdout nor an external URL is present.
    pub fn has_no_output(&self) -> bool {
        self.stdout.as_deref().map_or(true, str::is_empty) && self.stdout_url.is_none()
    }
}

/// What happened on one target: a terminal result or a polling failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Result(CommandResult),
    Error(PollError),
}

impl From<Result<CommandResult, PollError>> for TargetOutcome {
    fn from(value: Result<CommandResult, PollError>) -> Self {
        match value {
            Ok(result) => Self::Result(result),
            Err(error) => Self::Error(error),
        }
    }
}

/// Results serialise as their record; errors as `{"error": "<message>"}`.
impl Serialize for TargetOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Result(result) => result.serialize(serializer),
            Self::Error(error) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &error.to_string())?;
                map.end()
            }
        }
    }
}

/// Outcome of every target in one batch, keyed by target ID.
///
/// Ordered by target ID so the serialised response and the verdict's
/// representative error are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchResult {
    outcomes: BTreeMap<String, TargetOutcome>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `target_id`, replacing any previous one.
    pub fn insert(&mut self, target_id: impl Into<String>, outcome: TargetOutcome) {
        self.outcomes.insert(target_id.into(), outcome);
    }

    pub fn get(&self, target_id: &str) -> Option<&TargetOutcome> {
        self.outcomes.get(target_id)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetOutcome)> {
        self.outcomes.iter().map(|(id, outcome)| (id.as_str(), outcome))
    }

    /// Reduce the batch to a single verdict.
    ///
    /// Ok only if every target produced a `Success` result. Otherwise the
    /// representative error is the first polling failure, or failing that
    /// the first non-`Success` status, in target ID order.
    pub fn verdict(&self) -> Verdict {
        let poll_failure = self.iter().find_map(|(id, outcome)| match outcome {
            TargetOutcome::Error(error) => Some(VerdictError::Poll {
                target_id: id.to_string(),
                error: error.clone(),
            }),
            TargetOutcome::Result(_) => None,
        });

        let error = poll_failure.or_else(|| {
            self.iter().find_map(|(id, outcome)| match outcome {
                TargetOutcome::Result(result) if !result.status.is_success() => {
                    Some(VerdictError::Status {
                        target_id: id.to_string(),
                        status: result.status,
                    })
                }
                _ => None,
            })
        });

        Verdict { error }
    }
}

impl FromIterator<(String, TargetOutcome)> for BatchResult {
    fn from_iter<I: IntoIterator<Item = (String, TargetOutcome)>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

/// Pass/fail reduction of a [`BatchResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub error: Option<VerdictError>,
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
