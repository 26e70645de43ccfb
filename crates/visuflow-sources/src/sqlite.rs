//! SQLite schema, table, and query input

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Params, Statement, params};
use serde_json::{Map, Number, Value, json};

use crate::error::{Result, SourceError};
use crate::source::DataSource;

/// Rows shown when browsing a table.
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Schema of every user table:
///
/// ```text
/// { "tables": { "<name>": { "name", "columns": [..], "foreignKeys": [..], "indexes": [..] } } }
/// ```
pub fn extract_schema(conn: &Connection) -> Result<Value> {
    let mut tables = Map::new();
    for name in table_names(conn)? {
        let table = json!({
            "name": name,
            "columns": columns(conn, &name)?,
            "foreignKeys": foreign_keys(conn, &name)?,
            "indexes": indexes(conn, &name)?,
        });
        tables.insert(name, table);
    }

    tracing::debug!("Extracted schema for {} tables", tables.len());
    Ok(json!({ "tables": tables }))
}

fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

fn columns(conn: &Connection, table: &str) -> Result<Vec<Value>> {
    let mut stmt = conn.prepare(
        r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#,
    )?;
    let rows = stmt
        .query_map([table], |row| {
            Ok(json!({
                "name": row.get::<_, String>(0)?,
                "type": row.get::<_, String>(1)?,
                "notNull": row.get::<_, i64>(2)? != 0,
                "defaultValue": row.get::<_, Option<String>>(3)?,
                "primaryKey": row.get::<_, i64>(4)? != 0,
            }))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn foreign_keys(conn: &Connection, table: &str) -> Result<Vec<Value>> {
    let mut stmt = conn.prepare(
        r#"SELECT "table", "from", "to", on_update, on_delete
           FROM pragma_foreign_key_list(?1) ORDER BY id, seq"#,
    )?;
    let rows = stmt
        .query_map([table], |row| {
            Ok(json!({
                "table": row.get::<_, String>(0)?,
                "from": row.get::<_, String>(1)?,
                "to": row.get::<_, Option<String>>(2)?,
                "onUpdate": row.get::<_, String>(3)?,
                "onDelete": row.get::<_, String>(4)?,
            }))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn indexes(conn: &Connection, table: &str) -> Result<Vec<Value>> {
    let mut stmt = conn.prepare(r#"SELECT name, "unique" FROM pragma_index_list(?1)"#)?;
    let listed = stmt
        .query_map([table], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut info = conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
    let mut indexes = Vec::with_capacity(listed.len());
    for (name, unique) in listed {
        // expression index columns have no name
        let columns = info
            .query_map([&name], |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        indexes.push(json!({
            "name": name,
            "unique": unique,
            "columns": columns,
        }));
    }
    Ok(indexes)
}

/// First `limit` rows of `table`, each an object keyed by column name.
pub fn table_rows(conn: &Connection, table: &str, limit: usize) -> Result<Value> {
    let known: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    if !known {
        return Err(SourceError::UnknownTable(table.to_string()));
    }

    let sql = format!("SELECT * FROM {} LIMIT ?1", quote_identifier(table));
    let mut stmt = conn.prepare(&sql)?;
    // a negative LIMIT means no limit in SQLite
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    collect_rows(&mut stmt, params![limit])
}

/// Run arbitrary SQL and return every row it produces.
pub fn run_query(conn: &Connection, sql: &str) -> Result<Value> {
    let mut stmt = conn.prepare(sql)?;
    collect_rows(&mut stmt, [])
}

fn collect_rows<P: Params>(stmt: &mut Statement<'_>, params: P) -> Result<Value> {
    let names = row_keys(stmt.column_names());
    let mut rows = stmt.query(params)?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Map::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            record.insert(name.clone(), sql_to_json(row.get_ref(i)?));
        }
        out.push(Value::Object(record));
    }
    Ok(Value::Array(out))
}

/// Object keys for a result set. A repeated column name gets the suffix
/// `:N`, so `SELECT * FROM a JOIN b` keeps both `id` columns as `id` and `id:1`.
fn row_keys(columns: Vec<&str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(columns.len());
    columns
        .into_iter()
        .map(|name| {
            let mut key = name.to_string();
            let mut n = 0;
            while taken.contains(&key) {
                n += 1;
                key = format!("{}:{}", name, n);
            }
            if n > 0 {
                tracing::warn!("Result has more than one column named {:?}; keeping it as {:?}", name, key);
            }
            taken.insert(key.clone());
            key
        })
        .collect()
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<blob {} bytes>", bytes.len())),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Which view of the database to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteView {
    Schema,
    Table { name: String, limit: usize },
    Query(String),
}

/// A database file on disk, opened read-only.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pub path: PathBuf,
    pub view: SqliteView,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>, view: SqliteView) -> Self {
        Self {
            path: path.into(),
            view,
        }
    }

    /// Load synchronously on the current thread.
    pub fn load_blocking(&self) -> Result<Value> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        match &self.view {
            SqliteView::Schema => extract_schema(&conn),
            SqliteView::Table { name, limit } => table_rows(&conn, name, *limit),
            SqliteView::Query(sql) => run_query(&conn, sql),
        }
    }
}

#[async_trait]
impl DataSource for SqliteSource {
    fn describe(&self) -> String {
        match &self.view {
            SqliteView::Schema => format!("sqlite:{}", self.path.display()),
            SqliteView::Table { name, .. } => format!("sqlite:{}#{}", self.path.display(), name),
            SqliteView::Query(_) => format!("sqlite:{}?query", self.path.display()),
        }
    }

    async fn load(&self) -> Result<Value> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.load_blocking()).await?
    }
}
