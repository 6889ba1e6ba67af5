//! The remote command service seam and its request/response shapes.

use async_trait::async_trait;
use ssm_run_core::error::TransportError;

/// Document that runs its `commands` parameter as a shell script.
pub const RUN_SHELL_SCRIPT_DOCUMENT: &str = "AWS-RunShellScript";

/// One command sent to every target in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCommandRequest {
    pub document_name: String,
    pub target_ids: Vec<String>,
    /// Script lines, passed as the document's `commands` parameter.
    pub commands: Vec<String>,
    /// Passed as the document's `workingDirectory` parameter.
    pub working_directory: Vec<String>,
}

impl SendCommandRequest {
    /// Build a request running `command` through the shell-script document.
    pub fn shell_script(command: &str, target_ids: &[String], working_dir: &str) -> Self {
        Self {
            document_name: RUN_SHELL_SCRIPT_DOCUMENT.to_string(),
            target_ids: target_ids.to_vec(),
            commands: vec![command.to_string()],
            working_directory: vec![working_dir.to_string()],
        }
    }
}

/// Response to a send. The identifier is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendCommandResponse {
    pub command_id: Option<String>,
}

/// Snapshot of one target's invocation as returned by the service.
///
/// `status` is the raw wire string so unrecognised values reach the
/// poller intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status: Option<String>,
    pub standard_output_content: Option<String>,
    pub standard_output_url: Option<String>,
    pub standard_error_content: Option<String>,
}

/// Remote command-execution service.
///
/// Implementations must be shareable across the per-target poller tasks.
#[async_trait]
pub trait CommandService: Send + Sync {
    /// Send one command covering every target in `request`.
    async fn send_command(
        &self,
        request: &SendCommandRequest,
    ) -> Result<SendCommandResponse, TransportError>;

    /// Query the invocation of `command_id` on a single target.
    async fn get_command_invocation(
        &self,
        command_id: &str,
        target_id: &str,
    ) -> Result<InvocationResponse, TransportError>;
}
