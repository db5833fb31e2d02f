//! HTTP server wiring for carelog.
//!
//! Loads [`ServerConfig`], and builds the application [`Router`]: the JSON API
//! from `carelog-api` wrapped in request tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use carelog_core::{Analyzer, store::CareStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix of environment variables that override the config file, e.g.
/// `CARELOG_PORT=9000`.
pub const ENV_PREFIX: &str = "CARELOG";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("~/.local/share/carelog/carelog.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Layer the optional TOML file at `path` under `CARELOG_*` environment
/// variables.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix(ENV_PREFIX))
    .build()?
    .try_deserialize()
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

/// Build the application router for `analyzer`.
pub fn router<S>(analyzer: Arc<Analyzer<S>>) -> Router
where
  S: CareStore + 'static,
{
  carelog_api::api_router(analyzer).layer(TraceLayer::new_for_http())
}
