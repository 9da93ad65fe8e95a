//! [`Engine`]: one diff-and-notify pass over every followed subject.
//!
//! Per subject: resolve the query, fetch the subject's releases, drop the
//! ones already recorded, then for each remaining release persist it and
//! notify every subscriber. Persist comes first; a release is announced only
//! by the call that inserted its row, so two racing cycles cannot both
//! announce it.
//!
//! A subject's failure is logged and counted, never propagated. Only a failure
//! to list subscriptions aborts the cycle.

use std::{sync::Arc, time::Duration};

use castwatch_core::{
  notify::NotificationSink,
  provider::MetadataProvider,
  release::Release,
  store::{ReleaseStore, SubscriptionStore},
  subject::ResolvedSubject,
};
use futures::{StreamExt as _, stream};
use tokio::{sync::watch, time::Instant};
use tracing::{debug, info, warn};

use crate::{
  diff::new_releases,
  error::{CycleError, SubjectError},
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Subjects processed at the same time within one cycle.
  pub concurrency:     usize,
  /// Upper bound on resolving and fetching one subject.
  pub subject_timeout: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      concurrency:     4,
      subject_timeout: Duration::from_secs(60),
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Counters for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
  /// Subjects with at least one subscriber that were attempted.
  pub subjects:               usize,
  pub skipped_no_subscribers: usize,
  /// Subjects not started because shutdown was requested.
  pub skipped_shutdown:       usize,
  pub not_found:              usize,
  pub failed:                 usize,
  pub releases_recorded:      usize,
  pub notifications_sent:     usize,
  pub notifications_failed:   usize,
}

#[derive(Debug, Default)]
struct SubjectStats {
  recorded:      usize,
  notified:      usize,
  notify_failed: usize,
}

enum Outcome {
  Done(SubjectStats),
  Stopped,
  NotFound,
  Failed(SubjectStats),
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine<P, S, R, N> {
  provider:      Arc<P>,
  subscriptions: Arc<S>,
  releases:      Arc<R>,
  sink:          Arc<N>,
  config:        EngineConfig,
}

impl<P, S, R, N> Engine<P, S, R, N>
where
  P: MetadataProvider,
  S: SubscriptionStore,
  R: ReleaseStore,
  N: NotificationSink,
{
  pub fn new(
    provider: Arc<P>,
    subscriptions: Arc<S>,
    releases: Arc<R>,
    sink: Arc<N>,
    config: EngineConfig,
  ) -> Self {
    Self { provider, subscriptions, releases, sink, config }
  }

  /// Run one full cycle.
  pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
    self.cycle(None).await
  }

  /// Run one full cycle, skipping subjects not yet started once `stop`
  /// reads `true`.
  pub async fn run_cycle_until(
    &self,
    stop: &watch::Receiver<bool>,
  ) -> Result<CycleReport, CycleError> {
    self.cycle(Some(stop)).await
  }

  async fn cycle(
    &self,
    stop: Option<&watch::Receiver<bool>>,
  ) -> Result<CycleReport, CycleError> {
    let started = Instant::now();
    let subjects = self
      .subscriptions
      .subjects_with_subscribers()
      .await
      .map_err(|e| CycleError::Subscriptions(Box::new(e)))?;

    let mut report = CycleReport::default();
    let mut work = Vec::with_capacity(subjects.len());
    for (query, subscribers) in subjects {
      if subscribers.is_empty() {
        debug!(subject = %query, "no subscribers, skipping");
        report.skipped_no_subscribers += 1;
      } else {
        work.push((query, subscribers));
      }
    }

    info!(subjects = work.len(), "poll cycle started");

    let outcomes: Vec<Outcome> = stream::iter(work)
      .map(|(query, subscribers)| self.run_subject(query, subscribers, stop))
      .buffer_unordered(self.config.concurrency.max(1))
      .collect()
      .await;

    for outcome in outcomes {
      let stats = match outcome {
        Outcome::Stopped => {
          report.skipped_shutdown += 1;
          continue;
        }
        Outcome::NotFound => {
          report.subjects += 1;
          report.not_found += 1;
          continue;
        }
        Outcome::Failed(stats) => {
          report.failed += 1;
          stats
        }
        Outcome::Done(stats) => stats,
      };
      report.subjects += 1;
      report.releases_recorded += stats.recorded;
      report.notifications_sent += stats.notified;
      report.notifications_failed += stats.notify_failed;
    }

    info!(
      subjects = report.subjects,
      not_found = report.not_found,
      failed = report.failed,
      recorded = report.releases_recorded,
      notified = report.notifications_sent,
      notify_failed = report.notifications_failed,
      skipped_shutdown = report.skipped_shutdown,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "poll cycle finished"
    );

    Ok(report)
  }

  async fn run_subject(
    &self,
    query: String,
    subscribers: Vec<String>,
    stop: Option<&watch::Receiver<bool>>,
  ) -> Outcome {
    if stop.is_some_and(|s| *s.borrow()) {
      return Outcome::Stopped;
    }
    let mut stats = SubjectStats::default();
    match self.process_subject(&query, &subscribers, &mut stats).await {
      Ok(()) => Outcome::Done(stats),
      Err(SubjectError::NotFound) => {
        warn!(subject = %query, "no provider match, skipping");
        Outcome::NotFound
      }
      Err(e) => {
        warn!(subject = %query, error = %e, "subject failed, will retry next cycle");
        Outcome::Failed(stats)
      }
    }
  }

  async fn process_subject(
    &self,
    query: &str,
    subscribers: &[String],
    stats: &mut SubjectStats,
  ) -> Result<(), SubjectError> {
    let timeout = self.config.subject_timeout;
    let (subject, releases) = tokio::time::timeout(timeout, self.lookup(query))
      .await
      .map_err(|_| SubjectError::Timeout(timeout))??;

    if releases.is_empty() {
      debug!(subject = %query, provider_id = subject.provider_id, "no known releases");
      return Ok(());
    }

    let seen = self
      .releases
      .list_seen_keys(query)
      .await
      .map_err(SubjectError::store)?;
    let fresh = new_releases(&releases, &seen);

    debug!(
      subject = %query,
      resolved = %subject.name,
      known = releases.len(),
      new = fresh.len(),
      "diffed releases"
    );

    for release in fresh {
      let inserted = self
        .releases
        .record_release(query, release)
        .await
        .map_err(SubjectError::store)?;

      if !inserted {
        // Another row already holds this work id for the subject.
        debug!(subject = %query, release = %release.seen_key(), "already recorded");
        continue;
      }
      stats.recorded += 1;

      for subscriber in subscribers {
        self.announce(subscriber, query, release, stats).await;
      }
    }

    Ok(())
  }

  async fn lookup(&self, query: &str) -> Result<(ResolvedSubject, Vec<Release>), SubjectError> {
    let subject = self
      .provider
      .resolve_subject(query)
      .await
      .map_err(SubjectError::provider)?
      .ok_or(SubjectError::NotFound)?;

    let releases = self
      .provider
      .fetch_known_releases(&subject)
      .await
      .map_err(SubjectError::provider)?;

    Ok((subject, releases))
  }

  /// Deliver one notification. A failure is counted and logged; the release
  /// is already recorded, so this notification is lost.
  async fn announce(
    &self,
    subscriber: &str,
    query: &str,
    release: &Release,
    stats: &mut SubjectStats,
  ) {
    match self.sink.notify(subscriber, query, release).await {
      Ok(()) => stats.notified += 1,
      Err(e) => {
        stats.notify_failed += 1;
        warn!(
          subscriber,
          subject = %query,
          release = %release.seen_key(),
          error = %e,
          "notification failed and will not be retried"
        );
      }
    }
  }
}
