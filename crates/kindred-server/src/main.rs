//! kindred server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the family-tree JSON API over HTTP.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use kindred_core::taxonomy::Taxonomy;
use kindred_store_sqlite::SqliteStore;
use settings::ServerConfig;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "kindred family-tree server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  // An explicit catalog replaces whatever the store has persisted.
  let taxonomy = match &cfg.taxonomy_path {
    Some(path) => {
      let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read taxonomy at {path:?}"))?;
      let taxonomy = Taxonomy::from_json(&json)
        .with_context(|| format!("failed to parse taxonomy at {path:?}"))?;
      tracing::info!(definitions = taxonomy.definitions().len(), "loaded taxonomy override");
      Some(taxonomy)
    }
    None => None,
  };

  let store = SqliteStore::open_with_taxonomy(&cfg.store_path, taxonomy)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let app = kindred_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
