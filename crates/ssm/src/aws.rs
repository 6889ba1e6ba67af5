//! [`CommandService`] backed by AWS Systems Manager Run Command.

use async_trait::async_trait;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::Client;
use ssm_run_core::error::TransportError;

use crate::service::{CommandService, InvocationResponse, SendCommandRequest, SendCommandResponse};

/// SSM client wrapper implementing [`CommandService`].
#[derive(Debug, Clone)]
pub struct SsmCommandService {
    client: Client,
}

impl SsmCommandService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandService for SsmCommandService {
    async fn send_command(
        &self,
        request: &SendCommandRequest,
    ) -> Result<SendCommandResponse, TransportError> {
        let output = self
            .client
            .send_command()
            .document_name(&request.document_name)
            .set_instance_ids(Some(request.target_ids.clone()))
            .parameters("commands", request.commands.clone())
            .parameters("workingDirectory", request.working_directory.clone())
            .send()
            .await
            .map_err(transport_error)?;

        Ok(SendCommandResponse {
            command_id: output
                .command()
                .and_then(|command| command.command_id())
                .map(str::to_string),
        })
    }

    async fn get_command_invocation(
        &self,
        command_id: &str,
        target_id: &str,
    ) -> Result<InvocationResponse, TransportError> {
        let output = self
            .client
            .get_command_invocation()
            .command_id(command_id)
            .instance_id(target_id)
            .send()
            .await
            .map_err(transport_error)?;

        Ok(InvocationResponse {
            status: output.status().map(|status| status.as_str().to_string()),
            standard_output_content: output.standard_output_content().map(str::to_string),
            standard_output_url: output.standard_output_url().map(str::to_string),
            standard_error_content: output.standard_error_content().map(str::to_string),
        })
    }
}

/// Flatten an SDK error into a [`TransportError`].
///
/// Modelled service errors keep their error code; everything else
/// (dispatch, timeout, construction, unparseable response) becomes a
/// request failure carrying the full error chain.
fn transport_error<E, R>(err: SdkError<E, R>) -> TransportError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => TransportError::Service {
            code: service.code().unwrap_or("Unknown").to_string(),
            message: service
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| service.to_string()),
        },
        None => {
            let message = DisplayErrorContext(&err).to_string();
            tracing::debug!(error = %message, "SSM request failed before a service response");
            TransportError::Request(message)
        }
    }
}
