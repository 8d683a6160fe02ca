//! Background notification polling.
//!
//! One [`NotificationPoller`] owns a [`PollingState`]: the recurring timer,
//! the last fetched notifications and the guard that keeps fetch cycles
//! from overlapping. The state is shared by `Arc` with everything that reads
//! or updates the cache (panel, dispatcher, invitation flow).

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::{PollingConfig, UiConfig};
use crate::error::{report_swallowed, AppResult};
use crate::models::Notification;
use crate::services::client::RobotechClient;
use crate::services::panel::NotificationListView;
use crate::services::session::SessionStore;
use crate::ui::Ui;

/// Handle of the recurring cycle task. Dropping it stops the loop.
struct PollTimer {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Mutable polling context shared by one poller and its collaborators.
#[derive(Default)]
pub struct PollingState {
    timer: Mutex<Option<PollTimer>>,
    cache: RwLock<Vec<Notification>>,
    loading: AtomicBool,
    started: AtomicBool,
}

impl PollingState {
    pub fn new() -> Self {
        Self::default()
    }

    fn timer(&self) -> MutexGuard<'_, Option<PollTimer>> {
        self.timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// True while a timer task exists that has not finished.
    pub fn has_active_timer(&self) -> bool {
        self.timer()
            .as_ref()
            .map(|t| !t.task.is_finished())
            .unwrap_or(false)
    }
}

/// Holds the re-entrancy flag for the duration of one cycle.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// What one call to [`NotificationPoller::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was in flight; this one was dropped.
    Skipped,
    /// At least one of the two fetches succeeded and the cache was replaced.
    Refreshed {
        unread_ok: bool,
        read_ok: bool,
        total: usize,
    },
    /// Both fetches failed; the previous cache was left untouched.
    Stale,
}

/// Concatenate unread and read notifications, newest first.
///
/// The sort is stable, so equal timestamps keep fetch order (unread before
/// read). Notifications without a timestamp go last.
pub fn merge_notifications(unread: Vec<Notification>, read: Vec<Notification>) -> Vec<Notification> {
    let mut all = unread;
    all.extend(read);
    all.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    });
    all
}

#[derive(Clone)]
pub struct NotificationPoller {
    client: RobotechClient,
    session: Arc<dyn SessionStore>,
    ui: Arc<dyn Ui>,
    state: Arc<PollingState>,
    polling: PollingConfig,
    view: UiConfig,
}

impl NotificationPoller {
    pub fn new(
        client: RobotechClient,
        session: Arc<dyn SessionStore>,
        ui: Arc<dyn Ui>,
        state: Arc<PollingState>,
        polling: PollingConfig,
        view: UiConfig,
    ) -> Self {
        Self {
            client,
            session,
            ui,
            state,
            polling,
            view,
        }
    }

    pub fn state(&self) -> &Arc<PollingState> {
        &self.state
    }

    /// Start polling: one cycle right away, then one per interval.
    ///
    /// No-op (returns false) when already started or when the session is
    /// not authenticated.
    pub async fn start(&self) -> bool {
        if self.state.is_started() {
            return false;
        }
        if !self.session.is_authenticated() {
            tracing::debug!("Notification polling not started: session is not authenticated");
            return false;
        }
        if self
            .state
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        // A timer can survive from an earlier start that was never stopped.
        self.cancel_timer();

        tracing::info!(
            "Starting notification polling every {}s",
            self.polling.interval().as_secs()
        );
        self.refresh().await;

        // stop() may have run while the first cycle was in flight.
        if !self.state.is_started() {
            return false;
        }

        let timer = self.spawn_timer();
        *self.state.timer() = Some(timer);
        true
    }

    /// Cancel the recurring cycle and clear the started flag. Safe to call
    /// at any time, including when polling never started.
    pub fn stop(&self) {
        if self.cancel_timer() {
            tracing::info!("Notification polling stopped");
        }
        self.state.started.store(false, Ordering::SeqCst);
    }

    fn cancel_timer(&self) -> bool {
        match self.state.timer().take() {
            Some(timer) => {
                // The loop only checks for the signal between cycles, so a
                // cycle already in flight still completes.
                let _ = timer.stop.send(());
                true
            }
            None => false,
        }
    }

    fn spawn_timer(&self) -> PollTimer {
        let (stop, mut stop_rx) = oneshot::channel::<()>();
        let poller = self.clone();
        let period = self.polling.interval();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        tracing::debug!("Notification polling timer exiting");
                        break;
                    }
                    _ = ticker.tick() => {}
                }
                poller.refresh().await;
            }
        });

        PollTimer { stop, task }
    }

    /// Run one fetch/merge cycle.
    ///
    /// Failures of the individual fetches are swallowed; whatever succeeded
    /// replaces the cache and is rendered.
    pub async fn refresh(&self) -> CycleOutcome {
        let Some(_guard) = LoadingGuard::acquire(&self.state.loading) else {
            tracing::debug!("Notification cycle already running, skipping");
            return CycleOutcome::Skipped;
        };

        let unread = self
            .client
            .list_notifications(false, self.polling.unread_limit)
            .await;
        let read = self
            .client
            .list_notifications(true, self.polling.read_limit)
            .await;

        let unread = self.keep_or_report(unread, "Fetching unread notifications");
        let read = self.keep_or_report(read, "Fetching read notifications");

        if unread.is_none() && read.is_none() {
            return CycleOutcome::Stale;
        }

        let unread_ok = unread.is_some();
        let read_ok = read.is_some();
        let merged = merge_notifications(unread.unwrap_or_default(), read.unwrap_or_default());
        let total = merged.len();

        *self.state.cache.write().await = merged;
        tracing::debug!(total, unread_ok, read_ok, "Notification cache refreshed");
        self.render().await;

        CycleOutcome::Refreshed {
            unread_ok,
            read_ok,
            total,
        }
    }

    fn keep_or_report(
        &self,
        result: AppResult<Vec<Notification>>,
        context: &str,
    ) -> Option<Vec<Notification>> {
        match result {
            Ok(list) => Some(list),
            Err(e) => {
                report_swallowed(self.polling.failure_policy, context, &e);
                None
            }
        }
    }

    /// Snapshot of the cache, newest first.
    pub async fn cached(&self) -> Vec<Notification> {
        self.state.cache.read().await.clone()
    }

    /// Flip the read flag of the cached notifications with the given ids.
    /// `None` marks every cached notification.
    pub async fn mark_cached_read(&self, ids: Option<&[i64]>) -> usize {
        let mut cache = self.state.cache.write().await;
        let mut changed = 0;
        for n in cache.iter_mut().filter(|n| n.is_unread()) {
            let hit = match ids {
                Some(ids) => n.id.map(|id| ids.contains(&id)).unwrap_or(false),
                None => true,
            };
            if hit {
                n.read = true;
                changed += 1;
            }
        }
        changed
    }

    /// Hand the current cache to the UI.
    pub async fn render(&self) {
        let view = {
            let cache = self.state.cache.read().await;
            NotificationListView::build(
                &cache,
                Utc::now(),
                &self.view.language,
                self.view.visible_items,
            )
        };
        self.ui.render_notifications(&view);
    }
}
