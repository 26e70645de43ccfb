//! Integration tests for Visuflow
//!
//! These drive the built binary end to end: input file in, snapshot out.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;
use visuflow_core::{Graph, NodeKind, read_snapshot};

fn visuflow(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_visuflow"));
    // keep any local visuflow.toml or .env out of the run
    cmd.current_dir(dir)
        .env_remove("GITHUB_API_URL")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run visuflow")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "visuflow failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not a JSON snapshot")
}

fn graph_of(snapshot: &Value) -> Graph {
    serde_json::from_value(snapshot["graph"].clone()).unwrap()
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = run(visuflow(dir.path()).arg("--help"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("json"));
    assert!(stdout.contains("sqlite"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    let output = run(visuflow(dir.path()).arg("version"));
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("Visuflow v{}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_json_file_to_stdout() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("doc.json"),
        r#"{"name": "demo", "tags": ["a", "b"], "meta": {"stars": 3, "archived": null}}"#,
    )
    .unwrap();

    let output = run(visuflow(dir.path()).args(["json", "doc.json", "--check"]));
    let snapshot = stdout_json(&output);

    assert_eq!(snapshot["format"], 1);
    assert!(snapshot["source"].as_str().unwrap().ends_with("doc.json"));

    let graph = graph_of(&snapshot);
    graph.check_invariants().unwrap();
    assert_eq!(graph.node_count(), 8);
    assert_eq!(graph.max_depth(), 2);

    let tags = graph.find_by_path(&["tags"]).unwrap();
    assert_eq!(graph.node(tags).unwrap().kind, NodeKind::Array);
    let archived = graph.find_by_path(&["meta", "archived"]).unwrap();
    assert_eq!(graph.node(archived).unwrap().value, Some(Value::Null));
}

#[test]
fn test_json_from_stdin() {
    let dir = TempDir::new().unwrap();
    let mut child = visuflow(dir.path())
        .args(["json", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"[1, [2, 3]]").unwrap();
    let output = child.wait_with_output().unwrap();

    let snapshot = stdout_json(&output);
    assert_eq!(snapshot["source"], "json:<text>");
    let graph = graph_of(&snapshot);
    assert_eq!(graph.node_count(), 5);
    assert!(graph.find_by_path(&["1", "0"]).is_some());
}

#[test]
fn test_invalid_json_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.json"), "{\"a\": [1, 2}").unwrap();

    let output = run(visuflow(dir.path()).args(["json", "bad.json"]));
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid JSON"));
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(visuflow(dir.path()).args(["json", "nowhere.json"]));
    assert!(!output.status.success());
}

#[test]
fn test_output_file_round_trip() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("doc.json"), r#"{"a": {"b": {"c": {"d": 1}}}}"#).unwrap();

    let output = run(visuflow(dir.path()).args(["json", "doc.json", "-o", "out/graph.json"]));
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let snapshot = read_snapshot(&dir.path().join("out/graph.json")).unwrap();
    let graph = &snapshot.graph;
    assert_eq!(graph.node_count(), 5);

    // nodes at depth 3 and below start collapsed
    let c = graph.find_by_path(&["a", "b", "c"]).unwrap();
    assert!(!graph.node(c).unwrap().expanded);
    let b = graph.find_by_path(&["a", "b"]).unwrap();
    assert!(graph.node(b).unwrap().expanded);
}

#[test]
fn test_config_file_changes_layout() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("doc.json"), r#"{"a": 1, "b": 2}"#).unwrap();
    std::fs::write(
        dir.path().join("layout.toml"),
        "[engine.layout]\nhorizontal_spacing = 100.0\nvertical_spacing = 10.0\n",
    )
    .unwrap();

    let output = run(visuflow(dir.path()).args(["--config", "layout.toml", "json", "doc.json"]));
    let graph = graph_of(&stdout_json(&output));

    let b = graph.find_by_path(&["b"]).unwrap();
    let position = graph.node(b).unwrap().position.unwrap();
    assert_eq!(position.x, 150.0);
    assert_eq!(position.y, 60.0);
}

#[test]
fn test_default_config_file_is_picked_up() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("doc.json"), r#"{"a": {"b": 1}}"#).unwrap();
    std::fs::write(dir.path().join("visuflow.toml"), "[engine.transform]\nexpand_depth = 1\n").unwrap();

    let graph = graph_of(&stdout_json(&run(visuflow(dir.path()).args(["json", "doc.json"]))));
    let a = graph.find_by_path(&["a"]).unwrap();
    assert!(!graph.node(a).unwrap().expanded);
}

#[test]
fn test_sqlite_schema_and_table() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("shop.db");
    let conn = rusqlite::Connection::open(&db).unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE orders (
             id INTEGER PRIMARY KEY,
             customer_id INTEGER REFERENCES customers(id),
             total REAL
         );
         INSERT INTO customers VALUES (1, 'Grace'), (2, 'Edsger');
         INSERT INTO orders VALUES (1, 1, 9.5);",
    )
    .unwrap();
    drop(conn);

    let schema = graph_of(&stdout_json(&run(
        visuflow(dir.path()).args(["sqlite", "shop.db", "--check"]),
    )));
    let fk = schema
        .find_by_path(&["tables", "orders", "foreignKeys", "0", "table"])
        .unwrap();
    assert_eq!(schema.node(fk).unwrap().value, Some(Value::from("customers")));

    let rows = graph_of(&stdout_json(&run(
        visuflow(dir.path()).args(["sqlite", "shop.db", "--table", "customers", "--limit", "1"]),
    )));
    // Root, one row, two columns
    assert_eq!(rows.node_count(), 4);

    let query = graph_of(&stdout_json(&run(visuflow(dir.path()).args([
        "sqlite",
        "shop.db",
        "--query",
        "SELECT c.name, o.total FROM orders o JOIN customers c ON c.id = o.customer_id",
    ]))));
    let name = query.find_by_path(&["0", "name"]).unwrap();
    assert_eq!(query.node(name).unwrap().value, Some(Value::from("Grace")));
}

#[test]
fn test_sqlite_unknown_table_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("empty.db");
    rusqlite::Connection::open(&db)
        .unwrap()
        .execute_batch("CREATE TABLE t (x INTEGER);")
        .unwrap();

    let output = run(visuflow(dir.path()).args(["sqlite", "empty.db", "--table", "ghosts"]));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such table: ghosts"));
}

#[test]
fn test_sqlite_table_and_query_conflict() {
    let dir = TempDir::new().unwrap();
    let output = run(visuflow(dir.path()).args(["sqlite", "x.db", "--table", "t", "--query", "SELECT 1"]));
    assert!(!output.status.success());
}

#[test]
fn test_github_unreachable_api_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(visuflow(dir.path())
        .args(["github", "https://github.com/octo/demo"])
        .env("GITHUB_API_URL", "http://127.0.0.1:9"));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("github:octo/demo"));
}

#[test]
fn test_github_invalid_url_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(visuflow(dir.path()).args(["github", "not-a-repo"]));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid GitHub repository URL"));
}

#[test]
fn test_check_uses_configured_layout() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("doc.json"), r#"{"a": {"x": 1, "y": 2}, "b": [3]}"#).unwrap();
    std::fs::write(
        dir.path().join("visuflow.toml"),
        "[engine.layout]\nhorizontal_spacing = 40.0\nvertical_spacing = 15.0\norigin = { x = 0.0, y = 0.0 }\n",
    )
    .unwrap();

    let output = run(visuflow(dir.path()).args(["json", "doc.json", "--check"]));
    let graph = graph_of(&stdout_json(&output));
    let y = graph.find_by_path(&["a", "y"]).unwrap();
    assert_eq!(graph.node(y).unwrap().position.unwrap().x, 80.0);
}

#[test]
fn test_demo_json() {
    let dir = TempDir::new().unwrap();
    let snapshot = stdout_json(&run(visuflow(dir.path()).args(["demo", "--check"])));
    assert_eq!(snapshot["source"], "demo:json");

    let graph = graph_of(&snapshot);
    assert_eq!(graph.children(graph.root()).len(), 6);
    assert!(graph.find_by_path(&["devDependencies", "husky"]).is_some());
}

#[test]
fn test_demo_sqlite() {
    let dir = TempDir::new().unwrap();
    let snapshot = stdout_json(&run(visuflow(dir.path()).args(["demo", "sqlite", "--check"])));
    assert_eq!(snapshot["source"], "demo:sqlite");

    let graph = graph_of(&snapshot);
    let fk = graph
        .find_by_path(&["tables", "comments", "foreignKeys", "0", "table"])
        .unwrap();
    assert_eq!(graph.node(fk).unwrap().value, Some(Value::from("posts")));
}

#[test]
fn test_demo_unknown_kind_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(visuflow(dir.path()).args(["demo", "yaml"]));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown demo"));
}
