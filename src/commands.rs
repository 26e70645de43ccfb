//! CLI command implementations

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use visuflow_core::{Snapshot, to_json_string, write_snapshot};
use visuflow_server::{ServerConfig, ServerState, VisuflowServer};
use visuflow_sources::{
    DataSource, DemoSource, GithubClient, GithubSource, JsonSource, SqliteSource, SqliteView,
    load_graph,
};

use crate::config::AppConfig;

/// Where a built graph goes and whether it is checked first.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub output: Option<PathBuf>,
    pub check: bool,
}

pub async fn json(config: &AppConfig, input: &str, opts: &OutputOptions) -> anyhow::Result<()> {
    let source = if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("reading JSON from stdin")?;
        JsonSource::Text(text)
    } else {
        JsonSource::File(PathBuf::from(input))
    };
    emit(&source, config, opts).await
}

pub async fn github(config: &AppConfig, url: &str, opts: &OutputOptions) -> anyhow::Result<()> {
    let source = GithubSource::new(github_client(config)?, url)?;
    emit(&source, config, opts).await
}

pub async fn sqlite(
    config: &AppConfig,
    path: PathBuf,
    view: SqliteView,
    opts: &OutputOptions,
) -> anyhow::Result<()> {
    if !path.is_file() {
        anyhow::bail!("database not found: {}", path.display());
    }
    emit(&SqliteSource::new(path, view), config, opts).await
}

pub async fn demo(config: &AppConfig, demo: DemoSource, opts: &OutputOptions) -> anyhow::Result<()> {
    emit(&demo, config, opts).await
}

pub async fn serve(config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let server_config = ServerConfig {
        host: host.unwrap_or(config.server.host.clone()),
        port: port.unwrap_or(config.server.port),
    };
    tracing::info!(
        "Starting Visuflow server on {}:{}",
        server_config.host,
        server_config.port
    );

    let state = ServerState::new(config.engine.clone(), github_client(&config)?);
    VisuflowServer::new(state, server_config).start().await
}

fn github_client(config: &AppConfig) -> anyhow::Result<GithubClient> {
    GithubClient::new(config.github.api_url.clone(), config.github.token.clone())
        .context("creating GitHub client")
}

/// Load, optionally check, and write one snapshot.
async fn emit(source: &dyn DataSource, config: &AppConfig, opts: &OutputOptions) -> anyhow::Result<()> {
    let origin = source.describe();
    let graph = load_graph(source, &config.engine)
        .await
        .with_context(|| format!("loading {}", origin))?;

    if opts.check {
        graph
            .check_invariants()
            .with_context(|| format!("graph for {} failed the structure check", origin))?;
        graph
            .check_layout(&config.engine.layout)
            .with_context(|| format!("graph for {} failed the layout check", origin))?;
        tracing::info!("Structure and layout checks passed");
    }

    let snapshot = Snapshot::new(origin, graph);
    match &opts.output {
        Some(path) => {
            write_snapshot(&snapshot, path)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", to_json_string(&snapshot, true)?),
    }
    Ok(())
}
