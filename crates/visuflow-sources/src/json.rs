//! JSON text and file input

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::source::DataSource;

/// Parse JSON text, keeping object keys in document order.
pub fn parse_json(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Pasted text or an uploaded file.
#[derive(Debug, Clone)]
pub enum JsonSource {
    Text(String),
    File(PathBuf),
}

#[async_trait]
impl DataSource for JsonSource {
    fn describe(&self) -> String {
        match self {
            JsonSource::Text(_) => "json:<text>".to_string(),
            JsonSource::File(path) => format!("json:{}", path.display()),
        }
    }

    async fn load(&self) -> Result<Value> {
        match self {
            JsonSource::Text(text) => parse_json(text),
            JsonSource::File(path) => {
                tracing::debug!("Reading JSON file: {}", path.display());
                let text = tokio::fs::read_to_string(path).await?;
                parse_json(&text)
            }
        }
    }
}
