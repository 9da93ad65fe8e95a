//! [`TmdbClient`], a thin `reqwest` wrapper around the TMDB v3 API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
  Error, Result,
  models::{Paginated, PersonResult},
};

/// Base URL of the public TMDB v3 API.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Upper bound on pages fetched from one discover listing.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Connection settings for the TMDB API.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
  pub api_key:   String,
  pub base_url:  String,
  /// Per-request timeout, covering connect and body.
  pub timeout:   Duration,
  pub max_pages: u32,
}

impl TmdbConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:   api_key.into(),
      base_url:  DEFAULT_BASE_URL.to_string(),
      timeout:   Duration::from_secs(30),
      max_pages: DEFAULT_MAX_PAGES,
    }
  }
}

/// Async HTTP client for TMDB.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TmdbClient {
  client: Client,
  pub(crate) config: TmdbConfig,
}

impl TmdbClient {
  pub fn new(config: TmdbConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `GET <path>` with the API key and `params` as query parameters.
  ///
  /// Transport errors are stripped of their URL, which carries the API key.
  pub(crate) async fn get<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &[(&str, String)],
  ) -> Result<T> {
    let response = self
      .client
      .get(self.url(path))
      .query(&[("api_key", self.config.api_key.as_str())])
      .query(params)
      .send()
      .await
      .map_err(Error::http)?;

    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(Error::Api { status: status.as_u16(), message });
    }
    response.json().await.map_err(Error::http)
  }

  // ── Search ────────────────────────────────────────────────────────────────

  /// `GET /search/person?query=<query>`: ranked candidates, best first.
  pub async fn search_people(&self, query: &str) -> Result<Vec<PersonResult>> {
    let page: Paginated<PersonResult> = self
      .get("/search/person", &[("query", query.to_string())])
      .await?;
    Ok(page.results)
  }
}
