//! Input adapters: JSON documents, GitHub repository trees, SQLite databases,
//! and built-in demo samples
//!
//! Each adapter turns its origin into a plain `serde_json::Value` that the
//! core transformer can walk. Malformed input is rejected here, before a graph
//! is ever built.

pub mod demo;
pub mod error;
pub mod github;
pub mod json;
pub mod source;
pub mod sqlite;


pub use demo::{DEMO_PACKAGE_JSON, DEMO_SCHEMA_SQL, DemoSource, demo_database};
pub use error::{Result, SourceError};
pub use github::{DEFAULT_API_URL, GithubClient, GithubSource, RepoRef, TreeItem, nest_tree};
pub use json::{JsonSource, parse_json};
pub use source::{DataSource, load_graph};
pub use sqlite::{DEFAULT_ROW_LIMIT, SqliteSource, SqliteView, extract_schema, run_query, table_rows};
