//! WebSocket push of adopted snapshots

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use visuflow_core::Graph;

use crate::{Adopted, ServerState};

/// Messages a renderer may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    RequestFullGraph,
    Ping,
}

/// Messages the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    FullGraph { graph: &'a Graph, sequence: u64 },
    Pong,
    Error { message: String },
}

pub fn full_graph_message(adopted: &Adopted) -> serde_json::Result<String> {
    serde_json::to_string(&ServerMessage::FullGraph {
        graph: &adopted.snapshot.graph,
        sequence: adopted.sequence,
    })
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn current_message(state: &ServerState) -> Option<String> {
    let adopted = state.current().await?;
    match full_graph_message(&adopted) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Failed to serialize snapshot {}: {}", adopted.sequence, e);
            None
        }
    }
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    // subscribe before reading current so no adoption slips between the two
    let mut rx = state.snapshot_tx.subscribe();

    if let Some(message) = current_message(&state).await {
        if sender.send(Message::Text(message)).await.is_err() {
            warn!("Failed to send current graph to WebSocket client");
            return;
        }
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = reply_to(&text, &state).await;
                    if let Some(reply) = reply {
                        if sender.send(Message::Text(reply)).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            },
            outgoing = rx.recv() => match outgoing {
                Ok(message) => {
                    if sender.send(Message::Text(message)).await.is_err() {
                        debug!("Failed to push snapshot to WebSocket client");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagged by {} snapshots, resending current", skipped);
                    if let Some(message) = current_message(&state).await {
                        if sender.send(Message::Text(message)).await.is_err() {
                            break;
                        }
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("WebSocket client disconnected");
}

/// Answer one client message, if it needs an answer.
async fn reply_to(text: &str, state: &ServerState) -> Option<String> {
    debug!("Received WebSocket message: {}", text);

    let reply = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Ping) => ServerMessage::Pong,
        Ok(ClientMessage::RequestFullGraph) => {
            if let Some(message) = current_message(state).await {
                return Some(message);
            }
            ServerMessage::Error {
                message: "no graph has been loaded yet".to_string(),
            }
        }
        Err(e) => {
            warn!("Failed to parse WebSocket message: {}", e);
            ServerMessage::Error {
                message: format!("unrecognized message: {}", e),
            }
        }
    };
    serde_json::to_string(&reply).ok()
}
