//! HTTP server for Tiers.
//!
//! Serves the browser shell at `/` and the JSON API under `/api`, backed by a
//! single SQLite file.

pub mod error;

pub use error::{Error, Result};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, response::Html, routing::get};
use serde::Deserialize;
use tiers_core::store::HierarchyStore;
use tiers_store_sqlite::SqliteStore;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../static/index.html");

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TIERS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Wipe every entity when the server starts. Off unless asked for.
  #[serde(default)]
  pub reset_on_start: bool,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("hierarchy.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           default_host(),
      port:           default_port(),
      store_path:     default_store_path(),
      reset_on_start: false,
    }
  }
}

impl ServerConfig {
  /// Read the optional TOML file at `path`, then overlay `TIERS_*`
  /// environment variables. Missing keys fall back to defaults.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("TIERS"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Open the store named by `config`, keeping existing data unless
/// `reset_on_start` is set.
pub async fn open_store(config: &ServerConfig) -> Result<SqliteStore> {
  let path = expand_tilde(&config.store_path);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)?;
  }
  let store = SqliteStore::open(&path).await?;
  tracing::info!(path = %path.display(), "opened store");

  if config.reset_on_start {
    store.reset().await?;
    tracing::warn!(path = %path.display(), "reset_on_start is set; all data erased");
  }
  Ok(store)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/` plus the API nested at `/api`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: HierarchyStore + 'static,
{
  Router::new()
    .route("/", get(index))
    .nest("/api", tiers_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn index() -> Html<&'static str> { Html(INDEX_HTML) }

// ─── Integration tests ────────────────────────────────────────────────────────
