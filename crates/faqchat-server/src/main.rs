//! faqchat server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `FAQCHAT_*` environment variables, opens the relational store and the FAQ
//! index, warms the index up, and serves `POST /chat` over HTTP.
//!
//! Nested keys use `__` in the environment, e.g. `FAQCHAT_LLM__API_KEY`.
//!
//! ```
//! cargo run -p faqchat-server -- --config config.toml
//! cargo run -p faqchat-server -- --reindex
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use faqchat_index::{HttpEmbedder, SqliteVectorIndex};
use faqchat_llm::ChatCompletionsClient;
use faqchat_server::{
  AppState, ServerConfig,
  warmup::{WarmupPolicy, warm_up},
};
use faqchat_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "faqchat HTTP server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Clear and rebuild the FAQ index before serving, whatever the configured
  /// warm-up policy.
  #[arg(long)]
  reindex: bool,
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("FAQCHAT")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.llm.api_key.is_empty() {
    tracing::warn!("no LLM API key configured; set FAQCHAT_LLM__API_KEY");
  }

  // Open the relational store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Open the FAQ index.
  let embedder = HttpEmbedder::new(server_cfg.embedding.clone())
    .context("failed to build embedding client")?;
  let index_path = expand_tilde(&server_cfg.index_path);
  let index = SqliteVectorIndex::open(&index_path, embedder)
    .await
    .with_context(|| format!("failed to open FAQ index at {index_path:?}"))?;

  // Warm-up must succeed before any request is served.
  let policy = if cli.reindex { WarmupPolicy::Always } else { server_cfg.warmup_policy };
  let outcome = warm_up(&store, &index, policy)
    .await
    .context("FAQ index warm-up failed")?;
  tracing::info!(?policy, ?outcome, "FAQ index ready");

  let generator = ChatCompletionsClient::new(server_cfg.llm.clone())
    .context("failed to build generation client")?;

  let state = AppState::new(store, index, generator, server_cfg.chat.clone());
  let app = faqchat_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
