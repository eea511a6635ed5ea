//! Polling scheduler: one cooperative task per registered deadline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time;

use toolbox_core::config::share::ShareConfig;
use toolbox_core::traits::scheduler::{DelayedTaskScheduler, ScheduledAction, TaskOutcome};

/// Delayed task scheduler that wakes up at most every `poll_interval` to
/// compare the wall clock against each task's deadline.
///
/// A failing action is retried on the next poll until `retry_horizon` has
/// elapsed past its current deadline; after that the task is abandoned
/// and an error is logged.
#[derive(Debug, Clone)]
pub struct PollingScheduler {
    inner: Arc<SchedulerInner>,
}

#[derive(Debug)]
struct SchedulerInner {
    poll_interval: Duration,
    retry_horizon: Duration,
    /// Task id → generation of the registration currently in charge.
    tasks: DashMap<String, u64>,
    next_generation: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
}

impl PollingScheduler {
    /// Create a scheduler with explicit timings.
    pub fn new(poll_interval: Duration, retry_horizon: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(SchedulerInner {
                poll_interval,
                retry_horizon,
                tasks: DashMap::new(),
                next_generation: AtomicU64::new(1),
                shutdown_tx,
            }),
        }
    }

    /// Create a scheduler from the `[share]` configuration section.
    pub fn from_config(config: &ShareConfig) -> Self {
        Self::new(config.poll_interval(), config.retry_horizon())
    }

    /// Stop every running task. Deadlines persisted elsewhere are picked up
    /// again by the next process.
    pub fn shutdown(&self) {
        tracing::info!(
            pending = self.inner.tasks.len(),
            "Polling scheduler received shutdown signal"
        );
        self.inner.shutdown_tx.send_replace(true);
    }

    /// Stop the scheduler once the given shutdown channel flips to `true`.
    pub fn shutdown_on(&self, mut cancel: watch::Receiver<bool>) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            loop {
                if *cancel.borrow() {
                    break;
                }
                if cancel.changed().await.is_err() {
                    break;
                }
            }
            scheduler.shutdown();
        });
    }

    /// Whether a task with this id is still waiting or retrying.
    pub fn is_scheduled(&self, task_id: &str) -> bool {
        self.inner.tasks.contains_key(task_id)
    }
}

impl DelayedTaskScheduler for PollingScheduler {
    fn after(&self, task_id: String, deadline: DateTime<Utc>, action: ScheduledAction) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        if self.inner.tasks.insert(task_id.clone(), generation).is_some() {
            tracing::debug!(task_id = %task_id, "Superseding earlier registration");
        }

        let inner = Arc::clone(&self.inner);
        let cancel = self.inner.shutdown_tx.subscribe();
        tokio::spawn(async move {
            inner.drive(task_id, generation, deadline, action, cancel).await;
        });
    }

    fn pending(&self) -> usize {
        self.inner.tasks.len()
    }
}

impl SchedulerInner {
    async fn drive(
        &self,
        task_id: String,
        generation: u64,
        mut deadline: DateTime<Utc>,
        action: ScheduledAction,
        mut cancel: watch::Receiver<bool>,
    ) {

        loop {
            if !self.is_current(&task_id, generation) {
                return;
            }

            let now = Utc::now();
            if now < deadline {
                let remaining = (deadline - now).to_std().unwrap_or(Duration::ZERO);
                if !self.pause(remaining.min(self.poll_interval), &mut cancel).await {
                    self.finish(&task_id, generation);
                    return;
                }
                continue;
            }

            match action().await {
                Ok(TaskOutcome::Completed) => {
                    tracing::debug!(task_id = %task_id, "Scheduled task completed");
                    self.finish(&task_id, generation);
                    return;
                }
                Ok(TaskOutcome::Reschedule(next)) => {
                    tracing::debug!(task_id = %task_id, next = %next, "Scheduled task not due yet");
                    deadline = next;
                }
                Err(e) => {
                    let overdue = (Utc::now() - deadline)
                        .to_std()
                        .unwrap_or(Duration::ZERO);
                    if overdue >= self.retry_horizon {
                        tracing::error!(
                            task_id = %task_id,
                            error = %e,
                            overdue_seconds = overdue.as_secs(),
                            "Scheduled task failed past its retry horizon, giving up"
                        );
                        self.finish(&task_id, generation);
                        return;
                    }

                    tracing::warn!(
                        task_id = %task_id,
                        error = %e,
                        "Scheduled task failed, retrying on next poll"
                    );
                    if !self.pause(self.retry_delay(), &mut cancel).await {
                        self.finish(&task_id, generation);
                        return;
                    }
                }
            }
        }
    }

    /// Sleep for `duration`; returns `false` if shutdown was requested.
    async fn pause(&self, duration: Duration, cancel: &mut watch::Receiver<bool>) -> bool {
        if *cancel.borrow() {
            return false;
        }
        tokio::select! {
            changed = cancel.changed() => changed.is_ok() && !*cancel.borrow(),
            _ = time::sleep(duration) => true,
        }
    }

    /// Poll interval plus up to a quarter of it in jitter.
    fn retry_delay(&self) -> Duration {
        let spread = (self.poll_interval.as_millis() / 4) as u64;
        let jitter = if spread == 0 {
            0
        } else {
            rand::random_range(0..=spread)
        };
        self.poll_interval + Duration::from_millis(jitter)
    }

    fn is_current(&self, task_id: &str, generation: u64) -> bool {
        self.tasks
            .get(task_id)
            .is_some_and(|current| *current == generation)
    }

    fn finish(&self, task_id: &str, generation: u64) {
        self.tasks
            .remove_if(task_id, |_, current| *current == generation);
    }
}
