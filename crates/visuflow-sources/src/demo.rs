//! Built-in sample inputs: a `package.json` document and a small blog database

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;

use crate::error::Result;
use crate::json::parse_json;
use crate::source::DataSource;
use crate::sqlite::extract_schema;

/// The `package.json` of a small Next.js app.
pub const DEMO_PACKAGE_JSON: &str = r#"{
  "name": "jsontree",
  "version": "0.1.0",
  "private": true,
  "scripts": {
    "dev": "next dev",
    "build": "next build",
    "start": "next start",
    "lint": "next lint",
    "prepare": "husky install"
  },
  "dependencies": {
    "@headlessui/react": "^1.7.15",
    "@monaco-editor/react": "^4.5.1",
    "@tailwindcss/forms": "^0.5.4",
    "@types/node": "20.3.2",
    "@types/react": "18.2.14",
    "@types/react-dom": "18.2.6",
    "autoprefixer": "10.4.14",
    "eslint": "8.43.0",
    "eslint-config-next": "13.4.7",
    "html-to-image": "^1.11.11",
    "json5-parser": "^2.0.0",
    "lodash.debounce": "^4.0.8",
    "lodash.get": "^4.4.2",
    "next": "13.4.7",
    "postcss": "8.4.24",
    "prettier": "^2.8.8",
    "prettier-plugin-tailwindcss": "^0.3.0",
    "react": "18.2.0",
    "react-dom": "18.2.0",
    "react-zoom-pan-pinch": "^3.1.0",
    "reactflow": "^11.7.4",
    "tailwindcss": "^3.3.2",
    "typescript": "5.1.6",
    "zustand": "^4.3.9"
  },
  "devDependencies": {
    "@types/lodash.debounce": "^4.0.7",
    "husky": "^8.0.3",
    "lint-staged": "^13.2.3"
  }
}"#;

/// Users, their posts, and comments on those posts.
pub const DEMO_SCHEMA_SQL: &str = r#"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY NOT NULL,
        username TEXT NOT NULL,
        email TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
    CREATE UNIQUE INDEX idx_users_email ON users(email);

    CREATE TABLE posts (
        id INTEGER PRIMARY KEY NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE,
        title TEXT NOT NULL,
        content TEXT,
        published BOOLEAN DEFAULT 0,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX idx_posts_user_id ON posts(user_id);

    CREATE TABLE comments (
        id INTEGER PRIMARY KEY NOT NULL,
        post_id INTEGER NOT NULL REFERENCES posts(id) ON UPDATE CASCADE ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE,
        content TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX idx_comments_post_id ON comments(post_id);
    CREATE INDEX idx_comments_user_id ON comments(user_id);
"#;

/// An in-memory database holding the demo schema.
pub fn demo_database() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(DEMO_SCHEMA_SQL)?;
    Ok(conn)
}

/// Which built-in sample to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSource {
    Json,
    Sqlite,
}

impl fmt::Display for DemoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoSource::Json => write!(f, "json"),
            DemoSource::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for DemoSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(DemoSource::Json),
            "sqlite" => Ok(DemoSource::Sqlite),
            other => Err(format!("unknown demo {:?}, expected \"json\" or \"sqlite\"", other)),
        }
    }
}

#[async_trait]
impl DataSource for DemoSource {
    fn describe(&self) -> String {
        format!("demo:{}", self)
    }

    async fn load(&self) -> Result<Value> {
        match self {
            DemoSource::Json => parse_json(DEMO_PACKAGE_JSON),
            DemoSource::Sqlite => {
                tokio::task::spawn_blocking(|| extract_schema(&demo_database()?)).await?
            }
        }
    }
}
