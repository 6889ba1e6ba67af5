use std::fmt;
use std::time::Duration;

use ssm_run_core::error::ConfigError;
use ssm_run_core::targets::parse_target_ids;
use ssm_run_engine::poller::{PollConfig, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use ssm_run_engine::report::RunRequest;

/// Working directory used when the `working-dir` input is blank.
pub const DEFAULT_WORKING_DIR: &str = "/tmp";

/// Static AWS credentials taken from inputs or the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Action inputs loaded from the runner environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub command: String,
    /// May be empty; the run rejects that before contacting AWS.
    pub target_ids: Vec<String>,
    pub working_dir: String,
    pub region: Option<String>,
    /// `None` defers to the SDK default credential chain.
    pub credentials: Option<StaticCredentials>,
    pub poll: PollConfig,
}

impl ActionInputs {
    /// Load inputs from `INPUT_*` environment variables.
    ///
    /// | Input                   | Required | Default / fallback         |
    /// |-------------------------|----------|----------------------------|
    /// | `command`               | yes      | --                         |
    /// | `instance-ids`          | yes      | --                         |
    /// | `working-dir`           | no       | `/tmp`                     |
    /// | `region`                | no       | `AWS_REGION`               |
    /// | `aws-access-key-id`     | no       | `AWS_ACCESS_KEY_ID`        |
    /// | `aws-secret-access-key` | no       | `AWS_SECRET_ACCESS_KEY`    |
    /// | `timeout-seconds`       | no       | `120`                      |
    /// | `poll-interval-seconds` | no       | `5`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load inputs through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = |name: &str| non_blank(lookup(&input_env_name(name)));
        let env = |key: &str| non_blank(lookup(key));

        let command = input("command").ok_or_else(|| ConfigError::MissingInput("command".into()))?;
        let target_ids = parse_target_ids(&input("instance-ids").unwrap_or_default());
        let working_dir = input("working-dir").unwrap_or_else(|| DEFAULT_WORKING_DIR.into());
        let region = input("region").or_else(|| env("AWS_REGION"));

        let access_key_id = input("aws-access-key-id").or_else(|| env("AWS_ACCESS_KEY_ID"));
        let secret_access_key =
            input("aws-secret-access-key").or_else(|| env("AWS_SECRET_ACCESS_KEY"));
        let credentials = match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: env("AWS_SESSION_TOKEN"),
            }),
            _ => None,
        };

        let timeout = parse_secs("timeout-seconds", input("timeout-seconds"))?
            .unwrap_or(DEFAULT_POLL_TIMEOUT);
        let interval = parse_secs("poll-interval-seconds", input("poll-interval-seconds"))?
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        if interval.is_zero() {
            return Err(ConfigError::InvalidInput {
                name: "poll-interval-seconds".into(),
                value: "0".into(),
            });
        }

        Ok(Self {
            command,
            target_ids,
            working_dir,
            region,
            credentials,
            poll: PollConfig { timeout, interval },
        })
    }

    pub fn run_request(&self) -> RunRequest {
        RunRequest {
            command: self.command.clone(),
            target_ids: self.target_ids.clone(),
            working_dir: self.working_dir.clone(),
        }
    }
}

/// Environment variable the runner sets for an action input.
fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs(name: &str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidInput {
                    name: name.into(),
                    value: raw,
                })
        })
        .transpose()
}
