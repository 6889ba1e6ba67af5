//! Batch orchestration: one dispatch, one poller task per target, one
//! verdict.

use std::sync::Arc;

use ssm_run_core::error::{PollError, SendError};
use ssm_run_core::result::{BatchResult, TargetOutcome};
use ssm_run_core::targets::{normalize_target_ids, require_targets};
use ssm_run_ssm::service::CommandService;

use crate::dispatcher;
use crate::poller::{self, PollConfig};
use crate::report::{RunReport, RunRequest};

/// Runs a command across a batch of targets.
///
/// Cheap to clone; the service handle is shared with every poller task.
#[derive(Clone)]
pub struct BatchRunner {
    service: Arc<dyn CommandService>,
    poll: PollConfig,
}

impl BatchRunner {
    /// Create a runner with the default poll timeout and interval.
    pub fn new(service: Arc<dyn CommandService>) -> Self {
        Self {
            service,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Run a request end to end and summarise it for the host.
    ///
    /// Never fails: configuration, dispatch, and per-target problems all
    /// end up in the returned report. An empty target list is rejected
    /// without contacting the service. Target IDs are trimmed and
    /// deduplicated first, so each one is sent and polled once.
    pub async fn run(&self, request: &RunRequest) -> RunReport {
        let target_ids = normalize_target_ids(&request.target_ids);
        tracing::info!(
            command = %request.command,
            instance_ids = %target_ids.join(", "),
            "Running command",
        );

        if let Err(e) = require_targets(&target_ids) {
            tracing::error!(error = %e, "Invalid run configuration");
            return RunReport::failed(target_ids, None, e);
        }

        let batch = match self
            .run_batch(&request.command, &target_ids, &request.working_dir)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!(error = %e, "Unexpected error");
                return RunReport::failed(target_ids, None, e);
            }
        };

        match batch.verdict().error {
            None => {
                tracing::info!(output = ?batch, "Command executed successfully on all instances.");
                RunReport::success(target_ids, batch)
            }
            Some(error) => {
                tracing::error!(error = %error, "Errors occurred");
                RunReport::failed(target_ids, Some(batch), error)
            }
        }
    }

    /// Send the command once, then poll every target concurrently.
    ///
    /// Returns only after every poller has finished. A target's failure
    /// is recorded in its own entry and never affects its siblings; only
    /// a failed send fails the whole batch. `target_ids` must be
    /// non-empty and free of duplicates; [`BatchRunner::run`] ensures both.
    pub async fn run_batch(
        &self,
        command: &str,
        target_ids: &[String],
        working_dir: &str,
    ) -> Result<BatchResult, SendError> {
        tracing::debug!(command, ?target_ids, working_dir, "Running commands");

        let invocation =
            dispatcher::send_command(self.service.as_ref(), command, target_ids, working_dir)
                .await?;
        tracing::info!(command_id = %invocation, "Command ID: {invocation}");

        let handles = target_ids.iter().map(|target_id| {
            let service = Arc::clone(&self.service);
            let invocation = invocation.clone();
            let target_id = target_id.clone();
            let poll = self.poll;
            tokio::spawn(async move {
                poller::collect_target_result(service.as_ref(), &invocation, &target_id, &poll)
                    .await
            })
        });
        let joined = futures::future::join_all(handles).await;

        let batch = target_ids
            .iter()
            .zip(joined)
            .map(|(target_id, joined)| {
                let outcome = match joined {
                    Ok(Ok(result)) => {
                        tracing::debug!(target_id, ?result, "Received command result");
                        TargetOutcome::Result(result)
                    }
                    Ok(Err(e)) => {
                        tracing::error!(
                            command_id = %invocation,
                            target_id,
                            error = %e,
                            "Error running command on instance",
                        );
                        TargetOutcome::Error(e)
                    }
                    Err(e) => {
                        tracing::error!(target_id, error = %e, "Poller task did not complete");
                        TargetOutcome::Error(PollError::Aborted(e.to_string()))
                    }
                };
                (target_id.clone(), outcome)
            })
            .collect();

        Ok(batch)
    }
}
