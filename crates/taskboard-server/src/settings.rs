//! Runtime configuration, deserialised from `taskboard.toml` layered with
//! `TASKBOARD_*` environment variables.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//!
//! [store]
//! backend = "sqlite"
//! path    = "~/.local/share/taskboard/board.db"
//!
//! [authority]
//! identity      = "mentor"
//! username      = "mentor"
//! password_hash = "$argon2id$v=19$..."
//! ```
//!
//! Nested keys are reachable from the environment with a double underscore,
//! e.g. `TASKBOARD_STORE__BACKEND=memory`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use taskboard_api::AuthConfig;
use taskboard_core::Identity;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TASKBOARD";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:      String,
  #[serde(default = "default_port")]
  pub port:      u16,
  #[serde(default)]
  pub store:     StoreConfig,
  pub authority: AuthorityConfig,
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Memory,
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  #[serde(default)]
  pub backend: Backend,
  /// Database file; only read by the `sqlite` backend.
  #[serde(default = "default_store_path")]
  pub path:    PathBuf,
}

impl Default for StoreConfig {
  fn default() -> Self { Self { backend: Backend::default(), path: default_store_path() } }
}

fn default_store_path() -> PathBuf { PathBuf::from("taskboard.db") }

/// The single privileged identity and the credentials that prove it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityConfig {
  pub identity:      Identity,
  pub username:      String,
  pub password_hash: String,
}

impl AuthorityConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.username.clone(),
      password_hash: self.password_hash.clone(),
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
