//! Core data structures for the hierarchy graph

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arena index of a node. Unique within one transformation run.
///
/// On the wire this is the string `node-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NodeId(pub u64);

impl NodeId {
    pub const PREFIX: &'static str = "node-";

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

impl FromStr for NodeId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(NodeId)
            .ok_or_else(|| IdParseError(s.to_string()))
    }
}

impl TryFrom<String> for NodeId {
    type Error = IdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Edge identifier, derived from its endpoints. Serialized as `edge-<source>-<target>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EdgeId {
    pub source: NodeId,
    pub target: NodeId,
}

impl EdgeId {
    pub const PREFIX: &'static str = "edge-";

    pub fn new(source: NodeId, target: NodeId) -> Self {
        EdgeId { source, target }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", Self::PREFIX, self.source, self.target)
    }
}

impl From<EdgeId> for String {
    fn from(id: EdgeId) -> Self {
        id.to_string()
    }
}

impl FromStr for EdgeId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || IdParseError(s.to_string());
        let rest = s.strip_prefix(Self::PREFIX).ok_or_else(err)?;
        // `node-1-node-2`: the target starts at the second `node-` prefix
        let split = rest
            .get(NodeId::PREFIX.len()..)
            .and_then(|tail| tail.find(NodeId::PREFIX))
            .map(|pos| pos + NodeId::PREFIX.len())
            .ok_or_else(err)?;
        let source = rest[..split]
            .strip_suffix('-')
            .ok_or_else(err)?
            .parse()
            .map_err(|_| err())?;
        let target = rest[split..].parse().map_err(|_| err())?;
        Ok(EdgeId { source, target })
    }
}

impl TryFrom<String> for EdgeId {
    type Error = IdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A string that is not a valid node or edge id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed graph identifier: {0:?}")]
pub struct IdParseError(pub String);

/// Three-way classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Object,
    Array,
    Primitive,
}

impl NodeKind {
    /// Objects and arrays may have children; primitives never do.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::Primitive => "primitive",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 2D coordinate assigned by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// One vertex: the synthetic root or a key/value pair at some depth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    /// Originating key, array index, or `"Root"`.
    pub label: String,
    /// Present only for primitives. A JSON `null` is `Some(Value::Null)`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub value: Option<Value>,
    pub kind: NodeKind,
    pub depth: u32,
    /// Default expansion hint for the renderer.
    pub expanded: bool,
    pub position: Option<Position>,
}

/// A present field is `Some` even when it holds `null`; only absence is `None`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A parent-contains-child relationship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl GraphEdge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        GraphEdge {
            id: EdgeId::new(source, target),
            source,
            target,
        }
    }
}
