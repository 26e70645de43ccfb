//! HTTP + WebSocket server
//!
//! Builds a snapshot for each load request, adopts it as the current graph
//! and pushes it to every connected renderer. The newest adoption always
//! replaces the previous one wholesale.

pub mod handlers;
pub mod router;
pub mod websocket;


use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Serialize, Serializer};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, broadcast};
use visuflow_core::{EngineConfig, Graph, Snapshot};
use visuflow_sources::GithubClient;

pub use router::create_router;
pub use websocket::{ClientMessage, ServerMessage};

/// Broadcast slots per subscriber before it starts lagging.
const BROADCAST_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

/// A snapshot together with the adoption that made it current.
#[derive(Debug, Clone)]
pub struct Adopted {
    pub sequence: u64,
    pub snapshot: Arc<Snapshot>,
}

impl Serialize for Adopted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            sequence: u64,
            #[serde(flatten)]
            snapshot: &'a Snapshot,
        }

        Body {
            sequence: self.sequence,
            snapshot: &self.snapshot,
        }
        .serialize(serializer)
    }
}

/// Shared state behind every handler.
pub struct ServerState {
    pub current: RwLock<Option<Adopted>>,
    sequence: AtomicU64,
    /// Serialized `full_graph` messages, one per adoption.
    pub snapshot_tx: broadcast::Sender<String>,
    pub engine: EngineConfig,
    pub github: GithubClient,
}

impl ServerState {
    pub fn new(engine: EngineConfig, github: GithubClient) -> Self {
        let (snapshot_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            current: RwLock::new(None),
            sequence: AtomicU64::new(0),
            snapshot_tx,
            engine,
            github,
        }
    }

    /// Make `graph` the current snapshot and push it to subscribers.
    ///
    /// The write lock is held across the broadcast so subscribers see
    /// adoptions in sequence order.
    pub async fn adopt(&self, graph: Graph, source: impl Into<String>) -> Adopted {
        let snapshot = Arc::new(Snapshot::new(source, graph));
        let mut current = self.current.write().await;

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let adopted = Adopted { sequence, snapshot };
        *current = Some(adopted.clone());

        match websocket::full_graph_message(&adopted) {
            Ok(message) => {
                let receivers = self.broadcast(message);
                tracing::debug!("Broadcast snapshot {} to {} clients", sequence, receivers);
            }
            Err(e) => tracing::warn!("Failed to serialize snapshot {}: {}", sequence, e),
        }

        tracing::info!(
            "Adopted snapshot {} from {} ({} nodes)",
            sequence,
            adopted.snapshot.source,
            adopted.snapshot.graph.node_count()
        );
        adopted
    }

    pub async fn current(&self) -> Option<Adopted> {
        self.current.read().await.clone()
    }

    /// Send a raw message to all subscribers. Returns how many received it.
    pub fn broadcast(&self, message: String) -> usize {
        self.snapshot_tx.send(message).unwrap_or(0)
    }
}

/// The server: state plus where to listen.
pub struct VisuflowServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl VisuflowServer {
    pub fn new(state: ServerState, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(state),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> anyhow::Result<()> {
        let app = create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
