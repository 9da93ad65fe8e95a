//! The `ReleaseStore` and `SubscriptionStore` traits.
//!
//! Both are implemented by storage backends (e.g. `castwatch-store-sqlite`).
//! The engine and the API depend on these abstractions, not on any concrete
//! backend.

use std::{
  collections::{BTreeMap, HashSet},
  future::Future,
};

use crate::{
  release::{Release, SeenKey, SeenRelease},
  subject::Subscription,
};

/// Releases already recorded per subject.
///
/// Rows are unique on `(subject_query, work_id)` and never updated or deleted.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks.
pub trait ReleaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The [`SeenKey`]s recorded for `subject_query`. Empty if none.
  fn list_seen_keys<'a>(
    &'a self,
    subject_query: &'a str,
  ) -> impl Future<Output = Result<HashSet<SeenKey>, Self::Error>> + Send + 'a;

  /// Insert-or-ignore. Returns `true` only if this call inserted the row; a
  /// conflict on `(subject_query, work_id)` is a silent no-op returning
  /// `false`.
  fn record_release<'a>(
    &'a self,
    subject_query: &'a str,
    release: &'a Release,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// All releases recorded for `subject_query`, newest release date first.
  fn list_releases<'a>(
    &'a self,
    subject_query: &'a str,
  ) -> impl Future<Output = Result<Vec<SeenRelease>, Self::Error>> + Send + 'a;
}

/// Which subscribers follow which subject queries.
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Register a follow. Returns `true` if it is new; a duplicate is a no-op.
  fn follow<'a>(
    &'a self,
    subscriber_id: &'a str,
    subject_query: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every followed subject query mapped to its subscriber ids, sorted
  /// lexicographically.
  fn subjects_with_subscribers(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<String, Vec<String>>, Self::Error>>
  + Send
  + '_;

  /// Everything `subscriber_id` follows, sorted by subject query.
  fn follows_for<'a>(
    &'a self,
    subscriber_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;
}
