//! Integration tests for dispatch, concurrent polling, and the verdict.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::*;
use ssm_run_core::error::{ConfigError, PollError, SendError, TransportError, VerdictError};
use ssm_run_core::result::TargetOutcome;
use ssm_run_core::status::CommandStatus;
use ssm_run_engine::batch::BatchRunner;
use ssm_run_engine::dispatcher::send_command;
use ssm_run_engine::poller::PollConfig;
use ssm_run_engine::report::{RunFailure, RunRequest, RunStatus};
use ssm_run_ssm::service::SendCommandResponse;
use tokio::time::Instant;

fn request(command: &str, ids: &[&str]) -> RunRequest {
    RunRequest {
        command: command.to_string(),
        target_ids: targets(ids),
        working_dir: "/tmp".to_string(),
    }
}

fn runner(service: &Arc<ScriptedService>) -> BatchRunner {
    BatchRunner::new(service.clone())
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_names_every_target_in_one_request() {
    let service = ScriptedService::new();
    let ids = targets(&["i-1", "i-2", "i-3"]);

    let invocation = send_command(&service, "uptime", &ids, "/var/app")
        .await
        .expect("send should succeed");

    assert_eq!(invocation.command_id(), COMMAND_ID);
    let sent = service.sent_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].document_name, "AWS-RunShellScript");
    assert_eq!(sent[0].target_ids, ids);
    assert_eq!(sent[0].commands, vec!["uptime"]);
    assert_eq!(sent[0].working_directory, vec!["/var/app"]);
}

#[tokio::test]
async fn send_without_command_id_fails() {
    let service =
        ScriptedService::new().with_send_result(Ok(SendCommandResponse { command_id: None }));

    let result = send_command(&service, "uptime", &targets(&["i-1"]), "/tmp").await;

    assert_matches!(result, Err(SendError::MissingInvocationId));
}

#[tokio::test]
async fn send_with_blank_command_id_fails() {
    let service = ScriptedService::new().with_send_result(Ok(SendCommandResponse {
        command_id: Some("  ".to_string()),
    }));

    let result = send_command(&service, "uptime", &targets(&["i-1"]), "/tmp").await;

    assert_matches!(result, Err(SendError::MissingInvocationId));
}

#[tokio::test]
async fn send_transport_failure_is_wrapped() {
    let service = ScriptedService::new().with_send_result(Err(TransportError::Service {
        code: "InvalidInstanceId".to_string(),
        message: "not managed".to_string(),
    }));

    let result = send_command(&service, "uptime", &targets(&["i-1"]), "/tmp").await;

    assert_matches!(
        result,
        Err(SendError::Transport(TransportError::Service { ref code, .. })) if code == "InvalidInstanceId"
    );
}

// ---------------------------------------------------------------------------
// Batch verdicts
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn all_success_yields_ok_with_one_entry_per_target() {
    let service = Arc::new(
        ScriptedService::new()
            .script("i-1", vec![success_with_stdout("a")])
            .script("i-2", vec![status("InProgress"), success_with_stdout("b")])
            .script("i-3", vec![success_with_stdout("c")]),
    );

    let report = runner(&service).run(&request("hostname", &["i-1", "i-2", "i-3"])).await;

    assert_eq!(report.status(), RunStatus::Success);
    assert!(report.failure.is_none());
    let response = report.response.expect("response present");
    assert_eq!(response.len(), 3);
    assert!(response.verdict().is_ok());
    assert_eq!(service.send_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn mixed_failures_keep_every_target() {
    let service = Arc::new(
        ScriptedService::new()
            .script("i-1", vec![success_with_stdout("ok")])
            .script("i-2", vec![status("Failed")])
            .script("i-3", vec![query_error("throttled")]),
    );

    let report = runner(&service).run(&request("ls", &["i-1", "i-2", "i-3"])).await;

    assert_eq!(report.status(), RunStatus::Failure);
    let response = report.response.as_ref().expect("response present on failure");
    assert_eq!(response.len(), 3);
    assert_matches!(response.get("i-1"), Some(TargetOutcome::Result(r)) if r.status == CommandStatus::Success);
    assert_matches!(response.get("i-2"), Some(TargetOutcome::Result(r)) if r.status == CommandStatus::Failed);
    assert_matches!(response.get("i-3"), Some(TargetOutcome::Error(PollError::Query(_))));

    // Poll errors take precedence over non-success statuses.
    assert_matches!(
        report.failure,
        Some(RunFailure::Verdict(VerdictError::Poll { ref target_id, .. })) if target_id == "i-3"
    );
}

#[tokio::test(start_paused = true)]
async fn non_success_status_alone_fails_the_batch() {
    let service = Arc::new(
        ScriptedService::new()
            .script("i-1", vec![status("TimedOut")])
            .script("i-2", vec![status("Success")]),
    );

    let report = runner(&service).run(&request("ls", &["i-1", "i-2"])).await;

    assert_matches!(
        report.failure,
        Some(RunFailure::Verdict(VerdictError::Status { status: CommandStatus::TimedOut, .. }))
    );
    assert_eq!(report.response.as_ref().map(|r| r.len()), Some(2));
}

#[tokio::test(start_paused = true)]
async fn panicking_poller_is_recorded_for_its_target_only() {
    let service = Arc::new(
        ScriptedService::new()
            .script("i-ok", vec![success_with_stdout("fine")])
            .panic_on("i-bad"),
    );

    let report = runner(&service).run(&request("ls", &["i-bad", "i-ok"])).await;

    let response = report.response.as_ref().expect("response present");
    assert_eq!(response.len(), 2);
    assert_matches!(
        response.get("i-bad"),
        Some(TargetOutcome::Error(PollError::Aborted(message))) if message.contains("boom")
    );
    assert_matches!(
        response.get("i-ok"),
        Some(TargetOutcome::Result(r)) if r.status == CommandStatus::Success
    );
    assert_matches!(
        report.failure,
        Some(RunFailure::Verdict(VerdictError::Poll { ref target_id, error: PollError::Aborted(_) }))
            if target_id == "i-bad"
    );
}

#[tokio::test(start_paused = true)]
async fn duplicate_targets_are_sent_and_polled_once() {
    let service = Arc::new(ScriptedService::new().script("i-ok", vec![status("Success")]));

    let report = runner(&service)
        .run(&request("ls", &["i-ok", " i-ok", "i-ok"]))
        .await;

    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(report.response.as_ref().map(|r| r.len()), Some(1));
    let sent = service.sent_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target_ids, targets(&["i-ok"]));
    assert_eq!(service.query_calls("i-ok"), 1);
}

#[tokio::test]
async fn empty_target_list_never_sends() {
    let service = Arc::new(ScriptedService::new());

    let report = runner(&service).run(&request("ls", &[])).await;

    assert_eq!(report.status(), RunStatus::Failure);
    assert_matches!(report.failure, Some(RunFailure::Config(ConfigError::NoTargets)));
    assert_eq!(
        report.failure_message().as_deref(),
        Some("No valid instance IDs provided.")
    );
    assert!(report.response.is_none());
    assert_eq!(service.send_calls(), 0);
}

#[tokio::test]
async fn missing_command_id_starts_no_pollers() {
    let service = Arc::new(
        ScriptedService::new()
            .with_send_result(Ok(SendCommandResponse::default()))
            .script("i-1", vec![status("Success")]),
    );

    let report = runner(&service).run(&request("ls", &["i-1"])).await;

    assert_matches!(
        report.failure,
        Some(RunFailure::Send(SendError::MissingInvocationId))
    );
    assert!(report.response.is_none());
    assert_eq!(service.total_query_calls(), 0);
    assert_eq!(
        report.failure_message().as_deref(),
        Some("An unexpected error occurred: missing invocation id")
    );
}

// ---------------------------------------------------------------------------
// Concurrency and independent timeouts
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn sibling_timeout_does_not_affect_success() {
    let mut slow = vec![status("InProgress"); 11];
    slow.push(success_with_stdout("done"));
    let service = Arc::new(
        ScriptedService::new()
            .script("i-fast", slow)
            .script("i-stuck", vec![status("InProgress")]),
    );

    let report = runner(&service).run(&request("make", &["i-fast", "i-stuck"])).await;

    let response = report.response.as_ref().expect("response present");
    assert_matches!(
        response.get("i-fast"),
        Some(TargetOutcome::Result(r)) if r.status == CommandStatus::Success
    );
    assert_matches!(
        response.get("i-stuck"),
        Some(TargetOutcome::Error(PollError::TimedOut { timeout_ms: 120_000 }))
    );
    assert_eq!(service.query_calls("i-fast"), 12);
}

#[tokio::test(start_paused = true)]
async fn targets_are_polled_concurrently() {
    let three_polls = || vec![status("Pending"), status("InProgress"), status("Success")];
    let service = Arc::new(
        ScriptedService::new()
            .script("i-1", three_polls())
            .script("i-2", three_polls())
            .script("i-3", three_polls())
            .script("i-4", three_polls()),
    );

    let start = Instant::now();
    let batch = runner(&service)
        .run_batch("ls", &targets(&["i-1", "i-2", "i-3", "i-4"]), "/tmp")
        .await
        .expect("send should succeed");

    // Sequential polling would take 4 * 15s.
    assert_eq!(start.elapsed(), Duration::from_secs(15));
    assert_eq!(batch.len(), 4);
    assert_eq!(service.total_query_calls(), 12);
}

#[tokio::test(start_paused = true)]
async fn runner_uses_configured_poll_timing() {
    let service = Arc::new(ScriptedService::new().script("i-1", vec![status("InProgress")]));
    let runner = runner(&service).with_poll_config(PollConfig {
        timeout: Duration::from_secs(2),
        interval: Duration::from_secs(1),
    });

    let batch = runner
        .run_batch("sleep 600", &targets(&["i-1"]), "/tmp")
        .await
        .expect("send should succeed");

    assert_matches!(
        batch.get("i-1"),
        Some(TargetOutcome::Error(PollError::TimedOut { timeout_ms: 2000 }))
    );
    assert_eq!(service.query_calls("i-1"), 3);
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn one_success_one_timeout_reports_failure_with_full_response() {
    let service = Arc::new(
        ScriptedService::new()
            .script("i-1", vec![success_with_stdout("hi\n")])
            .script("i-2", vec![status("InProgress")]),
    );

    let report = runner(&service).run(&request("echo hi", &["i-1", "i-2"])).await;

    assert_eq!(report.status().as_str(), "failure");
    assert_eq!(service.query_calls("i-1"), 1);

    let response = serde_json::to_value(report.response.as_ref().expect("response present"))
        .expect("serialize response");
    assert_eq!(
        response,
        serde_json::json!({
            "i-1": { "status": "Success", "stdout": "hi\n" },
            "i-2": { "error": "Polling timed out after 120000ms" },
        })
    );
    assert_eq!(
        report.failure_message().as_deref(),
        Some(
            "Errors occurred running the command on instance IDs [i-1, i-2]: \
             instance i-2: Polling timed out after 120000ms"
        )
    );
}
