//! Configuration and wiring for the castwatch server binary.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context as _, ensure};
use castwatch_engine::EngineConfig;
use castwatch_store_sqlite::SqliteStore;
use castwatch_tmdb::{DEFAULT_BASE_URL, DEFAULT_MAX_PAGES, TmdbConfig};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `CASTWATCH_TMDB_API_KEY`.
pub const ENV_PREFIX: &str = "CASTWATCH";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "defaults::host")]
  pub host:               String,
  #[serde(default = "defaults::port")]
  pub port:               u16,
  /// SQLite file path. `:memory:` and a `sqlite://` prefix are accepted.
  #[serde(default = "defaults::database_url")]
  pub database_url:       String,
  pub tmdb_api_key:       String,
  #[serde(default = "defaults::tmdb_base_url")]
  pub tmdb_base_url:      String,
  #[serde(default = "defaults::poll_interval_ms")]
  pub poll_interval_ms:   u64,
  #[serde(default = "defaults::subject_timeout_ms")]
  pub subject_timeout_ms: u64,
  #[serde(default = "defaults::concurrency")]
  pub concurrency:        usize,
  #[serde(default = "defaults::max_pages")]
  pub max_pages:          u32,
}

mod defaults {
  pub fn host() -> String { "127.0.0.1".into() }
  pub fn port() -> u16 { 3000 }
  pub fn database_url() -> String { "castwatch.db".into() }
  pub fn tmdb_base_url() -> String { super::DEFAULT_BASE_URL.into() }
  pub fn poll_interval_ms() -> u64 { 60_000 }
  pub fn subject_timeout_ms() -> u64 { 60_000 }
  pub fn concurrency() -> usize { 4 }
  pub fn max_pages() -> u32 { super::DEFAULT_MAX_PAGES }
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
  Memory,
  File(PathBuf),
}

impl ServerConfig {
  /// Layer the TOML file at `path` (optional) under `CASTWATCH_*`
  /// environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()
      .context("failed to read configuration")?;
    Self::from_settings(settings)
  }

  pub fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> anyhow::Result<()> {
    ensure!(!self.tmdb_api_key.trim().is_empty(), "tmdb_api_key must not be empty");
    ensure!(self.poll_interval_ms > 0, "poll_interval_ms must be positive");
    ensure!(self.subject_timeout_ms > 0, "subject_timeout_ms must be positive");
    ensure!(self.concurrency > 0, "concurrency must be positive");
    ensure!(self.max_pages > 0, "max_pages must be positive");
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms) }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      concurrency:     self.concurrency,
      subject_timeout: Duration::from_millis(self.subject_timeout_ms),
    }
  }

  pub fn tmdb_config(&self) -> TmdbConfig {
    let mut tmdb = TmdbConfig::new(self.tmdb_api_key.clone());
    tmdb.base_url = self.tmdb_base_url.clone();
    tmdb.max_pages = self.max_pages;
    tmdb
  }

  pub fn store_location(&self) -> StoreLocation {
    let raw = self.database_url.trim();
    let raw = raw.strip_prefix("sqlite://").unwrap_or(raw);
    if raw == ":memory:" {
      StoreLocation::Memory
    } else {
      StoreLocation::File(expand_tilde(Path::new(raw)))
    }
  }
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Open the store named by `database_url`, creating parent directories.
pub async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  match cfg.store_location() {
    StoreLocation::Memory => SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store"),
    StoreLocation::File(path) => {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
          .await
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))
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
