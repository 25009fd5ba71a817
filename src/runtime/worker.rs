//! Off-thread simulation requests with one reply per request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::simulate::{simulate, SimulationParams, SimulationResult};

/// One simulation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Caller-chosen id echoed in the reply.
    pub id: u64,
    /// Draw setup.
    #[serde(flatten)]
    pub params: SimulationParams,
}

/// Reply to one request: either a result or an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReply {
    /// Id of the request this answers.
    pub id: u64,
    /// Estimate, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SimulationResult>,
    /// Failure text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimulationReply {
    fn ok(id: u64, result: SimulationResult) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failed(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Runs one request on the blocking pool.
pub async fn run_request(request: SimulationRequest) -> SimulationReply {
    let SimulationRequest { id, params } = request;
    match tokio::task::spawn_blocking(move || simulate(params)).await {
        Ok(result) => SimulationReply::ok(id, result),
        Err(err) => {
            tracing::warn!(id, error = %err, "simulation task failed");
            SimulationReply::failed(id, "Simulation failed")
        }
    }
}

/// Starts a worker that answers every request on the returned reply channel.
///
/// Requests run independently; replies arrive in completion order. The
/// worker stops once the request sender is dropped and in-flight runs finish.
pub fn spawn_simulation_worker(
    queue_bound: usize,
) -> (mpsc::Sender<SimulationRequest>, mpsc::Receiver<SimulationReply>) {
    let (req_tx, mut req_rx) = mpsc::channel::<SimulationRequest>(queue_bound);
    let (reply_tx, reply_rx) = mpsc::channel::<SimulationReply>(queue_bound);

    tokio::spawn(async move {
        while let Some(request) = req_rx.recv().await {
            let reply_tx = reply_tx.clone();
            tokio::spawn(async move {
                let reply = run_request(request).await;
                let _ = reply_tx.send(reply).await;
            });
        }
    });

    (req_tx, reply_rx)
}

/// Answers one JSON request with one JSON reply, synchronously.
///
/// Malformed requests get an error reply carrying whatever id could be read.
pub fn handle_json_message(message: &str) -> String {
    let reply = match serde_json::from_str::<Value>(message) {
        Ok(value) => {
            let id = value.get("id").and_then(Value::as_u64).unwrap_or(0);
            match serde_json::from_value::<SimulationRequest>(value) {
                Ok(request) => SimulationReply::ok(id, simulate(request.params)),
                Err(err) => SimulationReply::failed(id, format!("invalid request: {err}")),
            }
        }
        Err(err) => SimulationReply::failed(0, format!("invalid request: {err}")),
    };
    serde_json::to_string(&reply).unwrap_or_else(|err| {
        format!(r#"{{"id":{},"error":"{}"}}"#, reply.id, err.to_string().replace('"', "'"))
    })
}
