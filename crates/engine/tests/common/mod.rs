//! Shared test harness for engine integration tests.
//!
//! [`ScriptedService`] is an in-memory [`CommandService`] whose send
//! response and per-target query responses are scripted up front. The
//! last scripted query response for a target repeats forever, so a
//! single `InProgress` entry models a target that never finishes.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use ssm_run_core::error::TransportError;
use ssm_run_ssm::service::{
    CommandService, InvocationResponse, SendCommandRequest, SendCommandResponse,
};

pub const COMMAND_ID: &str = "cmd-0001";

pub type QueryResult = Result<InvocationResponse, TransportError>;

pub struct ScriptedService {
    send_result: Result<SendCommandResponse, TransportError>,
    scripts: Mutex<HashMap<String, VecDeque<QueryResult>>>,
    panicking: Vec<String>,
    sent: Mutex<Vec<SendCommandRequest>>,
    queries: Mutex<HashMap<String, usize>>,
}

impl Default for ScriptedService {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedService {
    /// A service whose send succeeds with [`COMMAND_ID`].
    pub fn new() -> Self {
        Self {
            send_result: Ok(SendCommandResponse {
                command_id: Some(COMMAND_ID.to_string()),
            }),
            scripts: Mutex::new(HashMap::new()),
            panicking: Vec::new(),
            sent: Mutex::new(Vec::new()),
            queries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_send_result(mut self, result: Result<SendCommandResponse, TransportError>) -> Self {
        self.send_result = result;
        self
    }

    /// Script the query responses for one target, in order.
    pub fn script(self, target_id: &str, responses: Vec<QueryResult>) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(target_id.to_string(), responses.into());
        self
    }

    /// Make every query for `target_id` panic.
    pub fn panic_on(mut self, target_id: &str) -> Self {
        self.panicking.push(target_id.to_string());
        self
    }

    pub fn send_calls(&self) -> usize {
        self.sent.lock().expect("sent lock").len()
    }

    pub fn sent_requests(&self) -> Vec<SendCommandRequest> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub fn query_calls(&self, target_id: &str) -> usize {
        self.queries
            .lock()
            .expect("queries lock")
            .get(target_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_query_calls(&self) -> usize {
        self.queries.lock().expect("queries lock").values().sum()
    }
}

#[async_trait]
impl CommandService for ScriptedService {
    async fn send_command(
        &self,
        request: &SendCommandRequest,
    ) -> Result<SendCommandResponse, TransportError> {
        self.sent.lock().expect("sent lock").push(request.clone());
        self.send_result.clone()
    }

    async fn get_command_invocation(
        &self,
        command_id: &str,
        target_id: &str,
    ) -> Result<InvocationResponse, TransportError> {
        assert_eq!(command_id, COMMAND_ID, "queried with an unexpected command id");
        *self
            .queries
            .lock()
            .expect("queries lock")
            .entry(target_id.to_string())
            .or_insert(0) += 1;

        if self.panicking.iter().any(|id| id == target_id) {
            panic!("boom");
        }

        let mut scripts = self.scripts.lock().expect("scripts lock");
        let Some(queue) = scripts.get_mut(target_id) else {
            return Err(TransportError::Service {
                code: "InvocationDoesNotExist".to_string(),
                message: format!("no invocation for {target_id}"),
            });
        };

        if queue.len() > 1 {
            queue.pop_front().expect("non-empty queue")
        } else {
            queue.front().cloned().expect("script must not be empty")
        }
    }
}

/// Query response carrying only a status.
pub fn status(status: &str) -> QueryResult {
    Ok(InvocationResponse {
        status: Some(status.to_string()),
        ..Default::default()
    })
}

/// Query response without any status field.
pub fn no_status() -> QueryResult {
    Ok(InvocationResponse::default())
}

/// `Success` with inline stdout.
pub fn success_with_stdout(stdout: &str) -> QueryResult {
    Ok(InvocationResponse {
        status: Some("Success".to_string()),
        standard_output_content: Some(stdout.to_string()),
        ..Default::default()
    })
}

pub fn query_error(message: &str) -> QueryResult {
    Err(TransportError::Request(message.to_string()))
}

pub fn targets(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
