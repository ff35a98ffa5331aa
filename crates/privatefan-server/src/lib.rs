//! Server wiring for PrivateFan: configuration and the top-level router.
//!
//! The binary in `main.rs` does little more than read a [`ServerConfig`],
//! open the store and hand both to [`app`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use privatefan_api::{AdminCredentials, ApiSettings, ApiState, api_router};
use privatefan_core::store::PlatformStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `PRIVATEFAN_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  #[serde(default = "default_store_path")]
  pub store_path:             PathBuf,
  pub admin_email:            String,
  /// PHC string produced by `privatefan --hash-password`.
  pub admin_password_hash:    String,
  #[serde(default = "default_retention")]
  pub notification_retention: usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("privatefan.db") }

fn default_retention() -> usize { ApiSettings::default().notification_retention }

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PRIVATEFAN"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn admin(&self) -> AdminCredentials {
    AdminCredentials {
      email:         self.admin_email.clone(),
      password_hash: self.admin_password_hash.clone(),
    }
  }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings { notification_retention: self.notification_retention }
  }

  /// Build the handler state around an opened store.
  pub fn state<S>(&self, store: S) -> ApiState<S> {
    ApiState {
      store:    Arc::new(store),
      admin:    Arc::new(self.admin()),
      settings: self.api_settings(),
    }
  }
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

// ─── Router ──────────────────────────────────────────────────────────────────

/// The whole application: the API under `/api`, wrapped in request tracing.
pub fn app<S>(state: ApiState<S>) -> Router
where
  S: PlatformStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{File, FileFormat};
  use privatefan_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn defaults_fill_in_optional_keys() {
    let cfg = parse(
      r#"
        admin_email = "admin@x.io"
        admin_password_hash = "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:3000");
    assert_eq!(cfg.store_path, PathBuf::from("privatefan.db"));
    assert_eq!(cfg.notification_retention, 200);
    assert_eq!(cfg.admin().email, "admin@x.io");
  }

  #[test]
  fn admin_credentials_are_required() {
    assert!(parse(r#"port = 8080"#).is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/pf.db")), PathBuf::from(home).join("pf.db"));
    assert_eq!(expand_tilde(Path::new("/var/pf.db")), PathBuf::from("/var/pf.db"));
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let cfg = parse(
      r#"
        admin_email = "admin@x.io"
        admin_password_hash = "unused"
        notification_retention = 5
      "#,
    )
    .unwrap();
    let state = cfg.state(SqliteStore::open_in_memory().await.unwrap());
    assert_eq!(state.settings.notification_retention, 5);

    let req = Request::builder()
      .uri("/api/posts/feed")
      .body(Body::empty())
      .unwrap();
    let resp = app(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!({ "posts": [] }));

    let req = Request::builder().uri("/posts/feed").body(Body::empty()).unwrap();
    let resp = app(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
