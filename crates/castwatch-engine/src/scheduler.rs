//! [`Scheduler`] runs a job once at start, then on a fixed interval.
//!
//! Runs happen inline on one task, so two runs never overlap. Ticks that fall
//! due while a run is in progress are coalesced into a single run that starts
//! as soon as the current one finishes; the schedule then resumes one full
//! interval later.

use std::{future::Future, sync::Arc, time::Duration};

use castwatch_core::{
  notify::NotificationSink,
  provider::MetadataProvider,
  store::{ReleaseStore, SubscriptionStore},
};
use tokio::{
  sync::watch,
  task::JoinHandle,
  time::{Instant, MissedTickBehavior},
};

use crate::{engine::Engine, error::CycleError};

// ─── Job ─────────────────────────────────────────────────────────────────────

/// Work the scheduler repeats.
pub trait SchedulerJob: Send + Sync + 'static {
  fn name(&self) -> &'static str;

  /// One run. Should stop picking up new work once `stop` reads `true`.
  fn execute<'a>(
    &'a self,
    stop: &'a watch::Receiver<bool>,
  ) -> impl Future<Output = Result<(), CycleError>> + Send + 'a;
}

impl<P, S, R, N> SchedulerJob for Engine<P, S, R, N>
where
  P: MetadataProvider + 'static,
  S: SubscriptionStore + 'static,
  R: ReleaseStore + 'static,
  N: NotificationSink + 'static,
{
  fn name(&self) -> &'static str { "poll" }

  async fn execute(&self, stop: &watch::Receiver<bool>) -> Result<(), CycleError> {
    self.run_cycle_until(stop).await.map(|_| ())
  }
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

pub struct Scheduler<J> {
  job:      Arc<J>,
  interval: Duration,
}

impl<J: SchedulerJob> Scheduler<J> {
  /// A zero `interval` is raised to one millisecond.
  pub fn new(job: Arc<J>, interval: Duration) -> Self {
    Self {
      job,
      interval: interval.max(Duration::from_millis(1)),
    }
  }

  /// Start the scheduler task. The first run begins immediately.
  pub fn spawn(self) -> SchedulerHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(self.run(stop_rx));
    SchedulerHandle { stop: stop_tx, task }
  }

  async fn run(self, mut stop: watch::Receiver<bool>) {
    let name = self.job.name();
    tracing::info!(job = name, interval_ms = self.interval.as_millis() as u64, "scheduler started");

    self.run_once(&stop).await;

    let mut timer = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        _ = timer.tick() => {}
        // Err means every handle is gone; treat it as a shutdown request.
        _ = stop.changed() => break,
      }
      if *stop.borrow() {
        break;
      }
      self.run_once(&stop).await;
    }

    tracing::info!(job = name, "scheduler stopped");
  }

  async fn run_once(&self, stop: &watch::Receiver<bool>) {
    let name = self.job.name();
    match self.job.execute(stop).await {
      Ok(()) => tracing::debug!(job = name, "job completed"),
      Err(e) => tracing::error!(job = name, error = %e, "job failed"),
    }
  }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Owner of a running scheduler. Dropping it also stops the scheduler after
/// its current run.
pub struct SchedulerHandle {
  stop: watch::Sender<bool>,
  task: JoinHandle<()>,
}

impl SchedulerHandle {
  /// Ask the scheduler to stop and wait for it. A run in progress finishes the
  /// subjects it already started.
  pub async fn shutdown(self) {
    let _ = self.stop.send(true);
    if let Err(e) = self.task.await {
      tracing::error!(error = %e, "scheduler task panicked");
    }
  }
}
