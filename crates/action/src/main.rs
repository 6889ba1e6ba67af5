//! `ssm-run` -- run a shell command on EC2 instances through SSM.
//!
//! Sends one `AWS-RunShellScript` command to every instance, waits for
//! each invocation to settle, and publishes the aggregated result as
//! action outputs.
//!
//! # Environment variables
//!
//! | Variable                      | Required | Default | Description                              |
//! |-------------------------------|----------|---------|------------------------------------------|
//! | `INPUT_COMMAND`               | yes      | --      | Shell command to run                     |
//! | `INPUT_INSTANCE-IDS`          | yes      | --      | Comma-separated instance IDs             |
//! | `INPUT_WORKING-DIR`           | no       | `/tmp`  | Working directory on the instances       |
//! | `INPUT_REGION`                | no       | --      | AWS region (falls back to `AWS_REGION`)  |
//! | `INPUT_TIMEOUT-SECONDS`       | no       | `120`   | Per-instance poll timeout                |
//! | `INPUT_POLL-INTERVAL-SECONDS` | no       | `5`     | Delay between status queries             |
//! | `GITHUB_OUTPUT`               | no       | --      | File receiving the outputs               |
//! | `LOG_FORMAT`                  | no       | --      | `json` for JSON logs                     |

use std::process::ExitCode;
use std::sync::Arc;

use ssm_run_action::config::ActionInputs;
use ssm_run_action::output::{self, GithubOutput};
use ssm_run_action::{aws, telemetry};
use ssm_run_core::targets::require_targets;
use ssm_run_engine::batch::BatchRunner;
use ssm_run_engine::report::RunReport;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    telemetry::init();

    let mut host = GithubOutput::from_env();

    let report = match ActionInputs::from_env() {
        Ok(inputs) => {
            tracing::info!(
                command = %inputs.command,
                working_dir = %inputs.working_dir,
                region = ?inputs.region,
                instance_ids = ?inputs.target_ids,
                timeout_secs = inputs.poll.timeout.as_secs(),
                interval_secs = inputs.poll.interval.as_secs(),
                "Parameters",
            );

            match require_targets(&inputs.target_ids) {
                Ok(()) => {
                    let service = aws::build_service(&inputs).await;
                    let runner =
                        BatchRunner::new(Arc::new(service)).with_poll_config(inputs.poll);
                    runner.run(&inputs.run_request()).await
                }
                Err(e) => {
                    tracing::error!(error = %e, "Nothing to run");
                    RunReport::rejected(e)
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid action inputs");
            RunReport::rejected(e)
        }
    };

    if let Err(e) = output::publish_report(&report, &mut host) {
        tracing::error!(error = %e, "Failed to write action outputs");
        return ExitCode::FAILURE;
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
