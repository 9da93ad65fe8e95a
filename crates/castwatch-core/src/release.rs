//! Release types: the works a subject appears in, and the keys used to
//! remember which of them have already been announced.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Media kind ──────────────────────────────────────────────────────────────

/// What sort of work a release is. Decided once, at the provider boundary.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
  Movie,
  Show,
}

impl MediaKind {
  /// Parse the lowercase tag stored in the database and used in seen keys.
  pub fn from_tag(tag: &str) -> Result<Self> {
    tag
      .parse()
      .map_err(|_| Error::UnknownMediaKind(tag.to_owned()))
  }
}

// ─── Release ─────────────────────────────────────────────────────────────────

/// A work associated with a subject, as reported by the provider this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
  /// Provider-side id of the work. Only unique together with `kind`.
  pub work_id:      String,
  pub kind:         MediaKind,
  pub title:        String,
  pub release_date: NaiveDate,
}

impl Release {
  pub fn seen_key(&self) -> SeenKey { SeenKey::new(self.kind, &self.work_id) }
}

// ─── Seen key ────────────────────────────────────────────────────────────────

/// Canonical `"<kind>:<work_id>"` marker for a release already recorded for a
/// subject, e.g. `movie:100`.
///
/// Built only through [`SeenKey::new`] so the store's read path and the
/// engine's diff path can never disagree on field order.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SeenKey(String);

impl SeenKey {
  pub fn new(kind: MediaKind, work_id: &str) -> Self {
    Self(format!("{kind}:{work_id}"))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SeenKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for SeenKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let (kind, work_id) = s
      .split_once(':')
      .filter(|(_, id)| !id.is_empty())
      .ok_or_else(|| Error::MalformedSeenKey(s.to_owned()))?;
    Ok(Self::new(MediaKind::from_tag(kind)?, work_id))
  }
}

// ─── Seen release ────────────────────────────────────────────────────────────

/// A release persisted for a subject. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRelease {
  pub subject_query: String,
  pub work_id:       String,
  pub kind:          MediaKind,
  pub title:         String,
  pub release_date:  NaiveDate,
  /// Server-assigned timestamp; never changes after creation.
  pub recorded_at:   DateTime<Utc>,
}

impl SeenRelease {
  pub fn seen_key(&self) -> SeenKey { SeenKey::new(self.kind, &self.work_id) }
}
