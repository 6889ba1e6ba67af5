//! Sends the command to the whole batch and extracts the invocation id.

use ssm_run_core::error::SendError;
use ssm_run_core::result::CommandInvocation;
use ssm_run_ssm::service::{CommandService, SendCommandRequest};

/// Send `command` to every target in one request.
///
/// The caller is responsible for rejecting an empty target list. A
/// response without a usable command ID is a hard failure and is never
/// retried.
pub async fn send_command(
    service: &dyn CommandService,
    command: &str,
    target_ids: &[String],
    working_dir: &str,
) -> Result<CommandInvocation, SendError> {
    let request = SendCommandRequest::shell_script(command, target_ids, working_dir);
    tracing::debug!(command, ?target_ids, working_dir, "Sending SSM command");

    let response = service.send_command(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Error sending command");
        SendError::from(e)
    })?;
    tracing::debug!(?response, "Received send command response");

    match response.command_id.filter(|id| !id.trim().is_empty()) {
        Some(command_id) => Ok(CommandInvocation::new(command_id)),
        None => {
            tracing::error!(
                command,
                instance_ids = %target_ids.join(", "),
                "Unable to find the command ID in the send response",
            );
            Err(SendError::MissingInvocationId)
        }
    }
}
