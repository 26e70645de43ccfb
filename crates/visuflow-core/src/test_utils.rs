//! Sample inputs shared by the core tests

use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;

/// A trimmed `package.json`, the kind of document people paste in.
pub fn package_json() -> Value {
    json!({
        "name": "jsontree",
        "version": "0.1.0",
        "private": true,
        "scripts": {
            "dev": "next dev",
            "build": "next build",
            "start": "next start"
        },
        "dependencies": {
            "next": "13.4.7",
            "react": "18.2.0",
            "reactflow": "^11.7.4"
        },
        "keywords": ["json", "graph", null]
    })
}

/// Two tables, `posts.user_id` referencing `users.id`.
pub fn two_table_schema() -> Value {
    json!({
        "tables": {
            "users": {
                "name": "users",
                "columns": [
                    { "name": "id", "type": "INTEGER", "notNull": true, "defaultValue": null, "primaryKey": true }
                ],
                "foreignKeys": [],
                "indexes": []
            },
            "posts": {
                "name": "posts",
                "columns": [
                    { "name": "id", "type": "INTEGER", "notNull": true, "defaultValue": null, "primaryKey": true },
                    { "name": "user_id", "type": "INTEGER", "notNull": true, "defaultValue": null, "primaryKey": false }
                ],
                "foreignKeys": [
                    { "table": "users", "from": "user_id", "to": "id", "onUpdate": "CASCADE", "onDelete": "CASCADE" }
                ],
                "indexes": [
                    { "name": "idx_posts_user_id", "unique": false, "columns": ["user_id"] }
                ]
            }
        }
    })
}

/// A wide grandchild under the first branch and a second branch beside it.
///
/// With direct-child weights the second branch's leaf lands on the same row
/// as the middle grandchild.
pub fn unbalanced() -> Value {
    json!({
        "a": { "x": { "p": 1, "q": 2, "r": 3 } },
        "b": { "y": { "s": 1 } }
    })
}

/// Write `value` as JSON into a fresh temp dir.
pub fn write_json(value: &Value, name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json() {
        let (_dir, path) = write_json(&package_json(), "package.json");
        let back: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, package_json());
    }
}
