//! Visuflow CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use visuflow_sources::{DEFAULT_ROW_LIMIT, DemoSource, SqliteView};

mod commands;
mod config;

use commands::OutputOptions;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "visuflow")]
#[command(about = "Turn JSON, GitHub repositories and SQLite databases into laid-out tree graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./visuflow.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Write the snapshot here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail unless the built graph passes the structure and layout checks
    #[arg(long)]
    check: bool,
}

impl From<OutputArgs> for OutputOptions {
    fn from(args: OutputArgs) -> Self {
        OutputOptions {
            output: args.output,
            check: args.check,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from a JSON file, or `-` for stdin
    Json {
        input: String,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Build a graph from a GitHub repository's file tree
    Github {
        url: String,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Build a graph from a SQLite database schema, table, or query
    Sqlite {
        path: PathBuf,
        /// Show rows of this table instead of the schema
        #[arg(long, conflicts_with = "query")]
        table: Option<String>,
        /// Show the result of this query instead of the schema
        #[arg(long)]
        query: Option<String>,
        /// Row limit for --table
        #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
        limit: usize,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Build a graph from a built-in sample: `json` or `sqlite`
    Demo {
        #[arg(default_value = "json")]
        kind: DemoSource,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Start the HTTP + WebSocket server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr; stdout carries graph output
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("visuflow={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Json { input, out } => commands::json(&config, &input, &out.into()).await,
        Commands::Github { url, out } => commands::github(&config, &url, &out.into()).await,
        Commands::Sqlite {
            path,
            table,
            query,
            limit,
            out,
        } => {
            let view = match (table, query) {
                (Some(name), _) => SqliteView::Table { name, limit },
                (None, Some(sql)) => SqliteView::Query(sql),
                (None, None) => SqliteView::Schema,
            };
            commands::sqlite(&config, path, view, &out.into()).await
        }
        Commands::Demo { kind, out } => commands::demo(&config, kind, &out.into()).await,
        Commands::Serve { port, host } => commands::serve(config, host, port).await,
        Commands::Version => {
            println!("Visuflow v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
