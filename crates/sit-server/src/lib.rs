//! HTTP server wiring for the situation API.
//!
//! Holds the runtime configuration and assembles the application router;
//! the binary in `main.rs` only parses arguments and binds the socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use serde::Deserialize;
use sit_api::{AppState, Backend};
use sit_core::{location::GisLocationRepresent, schema::Schema};
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `SIT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  /// Text shown for `sit_location` when a record has never been seen.
  #[serde(default = "default_location_none")]
  pub location_none: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/sit/sit.db") }

fn default_location_none() -> String { GisLocationRepresent::default().none }

impl ServerConfig {
  /// Read `path` (optional) and `SIT_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SIT"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The API router with request tracing, for `store` under `cfg`.
pub fn app<S: Backend>(
  store: Arc<S>,
  schema: &'static Schema,
  cfg: &ServerConfig,
) -> Router {
  let state = AppState::new(store, schema).with_represent(GisLocationRepresent {
    none: cfg.location_none.clone(),
  });
  sit_api::api_router(state).layer(TraceLayer::new_for_http())
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
