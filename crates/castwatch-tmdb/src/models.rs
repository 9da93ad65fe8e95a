//! Wire types for the TMDB responses castwatch consumes.
//!
//! Only the fields castwatch reads are declared; everything else in the
//! payload is ignored.

use castwatch_core::{
  release::{MediaKind, Release},
  subject::ResolvedSubject,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// One page of a paginated listing. A missing `results` key reads as empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paginated<T> {
  #[serde(default)]
  pub results:     Vec<T>,
  /// Absent on some error-shaped payloads; treated as "this is the last page".
  pub total_pages: Option<u32>,
}

// ─── People ──────────────────────────────────────────────────────────────────

/// A `/search/person` result.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonResult {
  pub id:                   u64,
  pub name:                 String,
  pub known_for_department: Option<String>,
  pub popularity:           Option<f64>,
  pub profile_path:         Option<String>,
}

impl PersonResult {
  pub fn into_resolved(self) -> ResolvedSubject {
    ResolvedSubject {
      provider_id:          self.id,
      name:                 self.name,
      known_for_department: self.known_for_department,
      popularity:           self.popularity,
      profile_path:         self.profile_path,
    }
  }
}

// ─── Works ───────────────────────────────────────────────────────────────────

/// A movie or TV item as TMDB returns it. Movies carry `title` and
/// `release_date`; shows carry `name` and `first_air_date`; mixed listings
/// add an explicit `media_type`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWork {
  pub id:             u64,
  pub media_type:     Option<String>,
  pub title:          Option<String>,
  pub name:           Option<String>,
  pub release_date:   Option<String>,
  pub first_air_date: Option<String>,
}

impl RawWork {
  /// Classify the item and convert it into a [`Release`].
  ///
  /// Returns `None` when the kind cannot be determined or no usable release
  /// date is present.
  pub fn into_release(self) -> Option<Release> {
    let kind = self.kind()?;

    let (primary, fallback) = match kind {
      MediaKind::Movie => (&self.release_date, &self.first_air_date),
      MediaKind::Show => (&self.first_air_date, &self.release_date),
    };
    let release_date = parse_date(primary.as_deref())
      .or_else(|| parse_date(fallback.as_deref()))?;

    let (primary, fallback) = match kind {
      MediaKind::Movie => (self.title, self.name),
      MediaKind::Show => (self.name, self.title),
    };
    let title = primary
      .or(fallback)
      .unwrap_or_else(|| "Untitled".to_string());

    Some(Release {
      work_id: self.id.to_string(),
      kind,
      title,
      release_date,
    })
  }

  fn kind(&self) -> Option<MediaKind> {
    match self.media_type.as_deref() {
      Some("movie") => Some(MediaKind::Movie),
      Some("tv") => Some(MediaKind::Show),
      Some(_) => None,
      None if self.title.is_some() => Some(MediaKind::Movie),
      None if self.name.is_some() => Some(MediaKind::Show),
      None => None,
    }
  }
}

fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
  let s = s?.trim();
  if s.is_empty() {
    return None;
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
