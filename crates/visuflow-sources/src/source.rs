//! Common interface over every input origin

use async_trait::async_trait;
use serde_json::Value;
use visuflow_core::{EngineConfig, Graph};

use crate::error::Result;

/// Something that can produce a hierarchical value for the transformer.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short origin tag, e.g. `github:owner/repo`.
    fn describe(&self) -> String;

    /// Fetch or read the value. Fails before any graph is built.
    async fn load(&self) -> Result<Value>;
}

/// Load a source and build its graph snapshot.
pub async fn load_graph(source: &dyn DataSource, config: &EngineConfig) -> Result<Graph> {
    let value = source.load().await?;
    let graph = Graph::build(&value, config);
    tracing::info!(
        "Built graph for {}: {} nodes, {} edges",
        source.describe(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
