//! [`MetadataProvider`] impl for [`TmdbClient`].

use castwatch_core::{
  provider::MetadataProvider,
  release::{MediaKind, Release},
  subject::ResolvedSubject,
};

use crate::{Error, Result, TmdbClient};

impl MetadataProvider for TmdbClient {
  type Error = Error;

  async fn resolve_subject(&self, query: &str) -> Result<Option<ResolvedSubject>> {
    let people = self.search_people(query).await?;
    Ok(people.into_iter().next().map(|p| p.into_resolved()))
  }

  async fn fetch_known_releases(&self, subject: &ResolvedSubject) -> Result<Vec<Release>> {
    let mut releases = Vec::new();

    for kind in [MediaKind::Movie, MediaKind::Show] {
      let works = self.discover_with_cast(kind, subject.provider_id).await?;
      let total = works.len();
      let before = releases.len();
      releases.extend(works.into_iter().filter_map(|w| w.into_release()));
      tracing::debug!(
        subject = %subject.name,
        %kind,
        total,
        usable = releases.len() - before,
        "classified discover results"
      );
    }

    Ok(releases)
  }
}
