//! Snapshot persistence as a versioned JSON envelope

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// Envelope format version.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// A graph plus where it came from and when it was built.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub format: u32,
    pub generator: String,
    pub generated_at: DateTime<Utc>,
    /// Human-readable origin, e.g. `json:package.json` or `github:owner/repo`.
    pub source: String,
    pub graph: Graph,
}

impl Snapshot {
    pub fn new(source: impl Into<String>, graph: Graph) -> Self {
        Snapshot {
            format: SNAPSHOT_FORMAT,
            generator: format!("visuflow {}", env!("CARGO_PKG_VERSION")),
            generated_at: Utc::now(),
            source: source.into(),
            graph,
        }
    }
}

/// Serialize a snapshot to a JSON string.
pub fn to_json_string(snapshot: &Snapshot, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    Ok(json)
}

/// Write a snapshot to `path`, creating parent directories.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = to_json_string(snapshot, true)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;

    tracing::debug!("Snapshot saved: {}", path.display());
    Ok(())
}

/// Read a snapshot back and re-check its structure.
pub fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot: Snapshot =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;

    if snapshot.format != SNAPSHOT_FORMAT {
        anyhow::bail!(
            "unsupported snapshot format {} (expected {})",
            snapshot.format,
            SNAPSHOT_FORMAT
        );
    }
    snapshot.graph.check_invariants()?;

    tracing::debug!("Snapshot loaded from: {}", path.display());
    Ok(snapshot)
}
