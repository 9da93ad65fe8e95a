//! The `MetadataProvider` trait and the filmography read model.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  release::{MediaKind, Release},
  subject::ResolvedSubject,
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an external movie/TV metadata service.
///
/// Implementations perform no caching and no retries; a failed call is retried
/// by the next poll cycle.
pub trait MetadataProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve a free-text query to the top-ranked entity. Returns `None` when
  /// the provider has no match.
  fn resolve_subject<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Option<ResolvedSubject>, Self::Error>> + Send + 'a;

  /// Every work associated with `subject` that carries a usable release date,
  /// in provider order.
  fn fetch_known_releases<'a>(
    &'a self,
    subject: &'a ResolvedSubject,
  ) -> impl Future<Output = Result<Vec<Release>, Self::Error>> + Send + 'a;
}

// ─── Filmography ─────────────────────────────────────────────────────────────

/// A subject's works split by kind, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filmography {
  pub movies: Vec<Release>,
  pub shows:  Vec<Release>,
}

impl Filmography {
  pub fn from_releases(releases: impl IntoIterator<Item = Release>) -> Self {
    let (mut movies, mut shows): (Vec<_>, Vec<_>) = releases
      .into_iter()
      .partition(|r| r.kind == MediaKind::Movie);
    // Stable sort keeps provider order among equal dates.
    movies.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    shows.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    Self { movies, shows }
  }
}
