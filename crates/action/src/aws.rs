//! AWS SDK configuration for the SSM client.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use ssm_run_ssm::aws::SsmCommandService;

use crate::config::ActionInputs;

/// Provider name recorded on credentials supplied through action inputs.
const INPUT_CREDENTIALS_PROVIDER: &str = "ssm-run-inputs";

/// Resolve the SDK configuration for the given inputs.
///
/// Explicit region and credentials win; anything left unset is resolved
/// by the SDK default chain (environment, profile, web identity, IMDS).
pub async fn load_sdk_config(inputs: &ActionInputs) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &inputs.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(creds) = &inputs.credentials {
        loader = loader.credentials_provider(Credentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            creds.session_token.clone(),
            None,
            INPUT_CREDENTIALS_PROVIDER,
        ));
    }

    loader.load().await
}

/// Build the SSM-backed command service.
pub async fn build_service(inputs: &ActionInputs) -> SsmCommandService {
    let sdk_config = load_sdk_config(inputs).await;
    tracing::debug!(region = ?sdk_config.region(), "AWS configuration loaded");
    SsmCommandService::new(aws_sdk_ssm::Client::new(&sdk_config))
}
