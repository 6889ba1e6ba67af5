//! Per-target status polling.
//!
//! [`poll_invocation`] waits one interval, then queries the invocation
//! until the service reports a terminal status or the poll timeout
//! elapses. [`collect_target_result`] adds the output checks applied to
//! every terminal result before it is recorded in the batch.

use std::time::Duration;

use ssm_run_core::error::PollError;
use ssm_run_core::result::{CommandInvocation, CommandResult};
use ssm_run_core::status::CommandStatus;
use ssm_run_ssm::service::{CommandService, InvocationResponse};
use tokio::time::Instant;

/// Default upper bound on how long a single target is polled.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(120);

/// Default delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Timing parameters for polling one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Measured from the start of this target's poll, not the batch.
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Poll one target until its invocation reaches a terminal status.
///
/// A terminal status is returned as soon as it is seen, even if the
/// timeout has already passed. Missing or unrecognised statuses are
/// logged and polled through. A failed query ends the poll for this
/// target.
pub async fn poll_invocation(
    service: &dyn CommandService,
    invocation: &CommandInvocation,
    target_id: &str,
    config: &PollConfig,
) -> Result<CommandResult, PollError> {
    let start = Instant::now();
    tracing::debug!(
        command_id = %invocation,
        target_id,
        timeout_ms = config.timeout.as_millis() as u64,
        interval_ms = config.interval.as_millis() as u64,
        "Polling started",
    );

    tokio::time::sleep(config.interval).await;

    loop {
        let response = service
            .get_command_invocation(invocation.command_id(), target_id)
            .await
            .map_err(|e| {
                tracing::error!(command_id = %invocation, target_id, error = %e, "Error during polling");
                PollError::Query(e)
            })?;
        tracing::debug!(target_id, ?response, "Received invocation response");

        if let Some(status) = interpret_status(target_id, response.status.as_deref()) {
            if status.is_terminal() {
                tracing::debug!(target_id, %status, "Invocation status is final");
                return Ok(into_result(status, response));
            }
        }

        if start.elapsed() > config.timeout {
            tracing::error!(
                command_id = %invocation,
                target_id,
                timeout_ms = config.timeout.as_millis() as u64,
                "Polling timed out",
            );
            return Err(PollError::TimedOut {
                timeout_ms: config.timeout.as_millis() as u64,
            });
        }

        tokio::time::sleep(config.interval).await;
    }
}

/// Poll one target and check what output the terminal result carries.
///
/// Output held in external storage is not fetched; the URL stays on the
/// result for the caller.
pub async fn collect_target_result(
    service: &dyn CommandService,
    invocation: &CommandInvocation,
    target_id: &str,
    config: &PollConfig,
) -> Result<CommandResult, PollError> {
    tracing::debug!(command_id = %invocation, target_id, "Getting command output");
    let result = poll_invocation(service, invocation, target_id, config).await?;

    if result.has_no_output() {
        tracing::info!(
            command_id = %invocation,
            target_id,
            "No output found for command on instance",
        );
    }

    if let Some(url) = result.stdout_url.as_deref() {
        tracing::warn!(
            target_id,
            url,
            "Standard output URL is present; fetching output from external storage is not implemented",
        );
    }

    Ok(result)
}

/// Map the raw wire status, warning about anything the poller cannot act on.
fn interpret_status(target_id: &str, raw: Option<&str>) -> Option<CommandStatus> {
    let Some(raw) = raw else {
        tracing::warn!(target_id, "Invocation status is undefined");
        return None;
    };

    let status = CommandStatus::from_wire(raw);
    if status.is_none() {
        tracing::warn!(target_id, status = raw, "Unrecognised invocation status; continuing to poll");
    }
    status
}

fn into_result(status: CommandStatus, response: InvocationResponse) -> CommandResult {
    CommandResult {
        status,
        stdout: response.standard_output_content,
        stderr: response.standard_error_content,
        stdout_url: response.standard_output_url,
    }
}
