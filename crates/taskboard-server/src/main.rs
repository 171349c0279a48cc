//! Taskboard server binary.
//!
//! Reads `taskboard.toml` (or the path specified with `--config`), opens the
//! configured store and serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `authority.password_hash`:
//!
//! ```
//! cargo run -p taskboard-server -- --hash-password
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use taskboard_api::AppState;
use taskboard_core::store::TrackerStore;
use taskboard_store_memory::MemoryStore;
use taskboard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{Backend, ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Taskboard record tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "taskboard.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  let authority = server_cfg.authority.identity.clone();

  match server_cfg.store.backend {
    Backend::Memory => {
      tracing::warn!("using the in-memory store; state is lost on shutdown");
      serve(MemoryStore::new(authority), &server_cfg).await
    }
    Backend::Sqlite => {
      let path = expand_tilde(&server_cfg.store.path);
      let store = SqliteStore::open(&path, authority)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(store, &server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: TrackerStore + Clone + 'static,
{
  let state = AppState::new(store, server_cfg.authority.auth());
  let app = taskboard_api::router(state).layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!(
    authority = %server_cfg.authority.identity,
    backend = ?server_cfg.store.backend,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
