// ── Sampling engine ──
//
// Owns the Idle/Running state machine. Each session is driven by a single
// task that holds both timers (periodic tick + one-shot deadline), so
// ticks never overlap and finalization runs exactly once.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use strum::Display;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::aggregate::UsageAggregator;
use crate::alerts::AlertEvaluator;
use crate::error::CoreError;
use crate::model::{
    Alert, ConnectionInfo, Counters, CurrentStats, DailyUsage, HistoryEntry, Sample, compute_rate,
};
use crate::source::DataSource;
use crate::store::Store;

/// Session length used when the caller does not pick one.
pub const DEFAULT_SESSION_BUDGET: Duration = Duration::from_secs(30);

// ── Public state types ───────────────────────────────────────────

/// Monitoring state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MonitorState {
    Idle,
    Running,
}

/// Result of a [`SamplingEngine::start`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already active; nothing changed.
    AlreadyRunning,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionEnd {
    Stopped,
    #[strum(serialize = "budget elapsed")]
    BudgetElapsed,
}

/// What a finished session left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub entry: HistoryEntry,
    pub alert: Option<Alert>,
    pub ended_by: SessionEnd,
}

/// Snapshot returned by [`SamplingEngine::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub state: MonitorState,
    pub stats: CurrentStats,
    pub today: DailyUsage,
}

// ── SamplingEngine ───────────────────────────────────────────────

/// Turns a cumulative counter feed into live rates and session history.
///
/// Cheaply cloneable; clones share the same session. Independent engines
/// (each with its own store and source) can coexist in one process.
#[derive(Clone)]
pub struct SamplingEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Arc<Store>,
    source: Arc<dyn DataSource>,
    aggregator: UsageAggregator,
    evaluator: AlertEvaluator,
    state: watch::Sender<MonitorState>,
    stats: watch::Sender<CurrentStats>,
    session: Mutex<Option<ActiveSession>>,
}

struct ActiveSession {
    cancel: CancellationToken,
    driver: JoinHandle<Result<SessionSummary, CoreError>>,
}

/// Fixed parameters of one session, captured at start.
#[derive(Debug, Clone, Copy)]
struct SessionPlan {
    baseline: Sample,
    refresh: Duration,
    budget: Duration,
}

impl SamplingEngine {
    pub fn new(store: Arc<Store>, source: Arc<dyn DataSource>) -> Self {
        let (state, _) = watch::channel(MonitorState::Idle);
        let (stats, _) = watch::channel(CurrentStats::default());
        Self {
            inner: Arc::new(EngineInner {
                aggregator: UsageAggregator::new(Arc::clone(&store)),
                evaluator: AlertEvaluator::new(Arc::clone(&store)),
                store,
                source,
                state,
                stats,
                session: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.inner.source
    }

    pub fn aggregator(&self) -> &UsageAggregator {
        &self.inner.aggregator
    }

    pub fn evaluator(&self) -> &AlertEvaluator {
        &self.inner.evaluator
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Begin a monitoring session that ends on [`stop`](Self::stop) or
    /// after `budget`, whichever comes first.
    ///
    /// Calling this while a session is active is a logged no-op.
    pub async fn start(&self, budget: Duration) -> Result<StartOutcome, CoreError> {
        let mut slot = self.inner.session.lock().await;

        if self.is_monitoring() {
            info!("already monitoring, start ignored");
            return Ok(StartOutcome::AlreadyRunning);
        }
        if let Some(finished) = slot.take() {
            // Session ended on its deadline and nobody collected it. The
            // driver may still be returning; joining waits it out.
            if let Err(e) = join_driver(finished.driver).await {
                debug!(error = %e, "previous session ended with an error");
            }
        }

        let settings = self.inner.store.settings();
        let baseline = Sample::now(self.inner.source.sample_counters()?);
        let plan = SessionPlan {
            baseline,
            refresh: settings.refresh_interval(),
            budget,
        };

        self.inner.stats.send_replace(CurrentStats {
            connections: self.inner.source.list_connections(),
            ..CurrentStats::default()
        });
        self.inner.state.send_replace(MonitorState::Running);

        let cancel = CancellationToken::new();
        let driver = tokio::spawn(run_session(
            Arc::clone(&self.inner),
            plan,
            cancel.clone(),
        ));
        *slot = Some(ActiveSession { cancel, driver });

        info!(
            refresh_ms = settings.refresh_interval_ms,
            budget_secs = budget.as_secs(),
            "monitoring started"
        );
        Ok(StartOutcome::Started)
    }

    /// End the active session and persist its history entry.
    ///
    /// Returns `Ok(None)` when there is nothing to stop. Both timers are
    /// gone by the time this returns. A failed history write is returned
    /// as an error; the engine is idle either way.
    pub async fn stop(&self) -> Result<Option<SessionSummary>, CoreError> {
        let mut slot = self.inner.session.lock().await;

        if !self.is_monitoring() {
            debug!("stop ignored, not monitoring");
            return Ok(None);
        }
        let Some(active) = slot.take() else {
            return Ok(None);
        };

        active.cancel.cancel();
        join_driver(active.driver).await.map(Some)
    }

    /// Wait for the current session to end (by `stop` or its deadline)
    /// and collect its summary.
    ///
    /// Returns `Ok(None)` if there was no session, or if a concurrent
    /// `stop` already collected it.
    pub async fn wait(&self) -> Result<Option<SessionSummary>, CoreError> {
        let mut state = self.inner.state.subscribe();
        if state
            .wait_for(|s| *s == MonitorState::Idle)
            .await
            .is_err()
        {
            return Ok(None);
        }

        let finished = self.inner.session.lock().await.take();
        match finished {
            Some(active) => join_driver(active.driver).await.map(Some),
            None => Ok(None),
        }
    }

    // ── Read-only accessors ──────────────────────────────────────

    pub fn state(&self) -> MonitorState {
        *self.inner.state.borrow()
    }

    /// Whether a session is running. `start` and `stop` decide from the
    /// same state, so this never disagrees with them.
    pub fn is_monitoring(&self) -> bool {
        self.state() == MonitorState::Running
    }

    pub fn current_stats(&self) -> CurrentStats {
        self.inner.stats.borrow().clone()
    }

    /// Receive a fresh [`CurrentStats`] after every tick.
    pub fn subscribe_stats(&self) -> watch::Receiver<CurrentStats> {
        self.inner.stats.subscribe()
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            state: self.state(),
            stats: self.current_stats(),
            today: self.inner.aggregator.today(),
        }
    }

    /// Connection snapshot from the latest tick.
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.inner.stats.borrow().connections.clone()
    }

    /// Newest-first history, at most `limit` entries.
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.inner.aggregator.recent_history(limit)
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.evaluator.alerts()
    }

    pub fn daily_usage(&self, date: NaiveDate) -> DailyUsage {
        self.inner.aggregator.daily_usage(date)
    }
}

impl std::fmt::Debug for SamplingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplingEngine")
            .field("state", &self.state())
            .field("store", &self.inner.store.dir())
            .finish_non_exhaustive()
    }
}

// ── Session driver ───────────────────────────────────────────────

async fn join_driver(
    driver: JoinHandle<Result<SessionSummary, CoreError>>,
) -> Result<SessionSummary, CoreError> {
    driver
        .await
        .map_err(|e| CoreError::Internal(format!("session task failed: {e}")))?
}

async fn run_session(
    inner: Arc<EngineInner>,
    plan: SessionPlan,
    cancel: CancellationToken,
) -> Result<SessionSummary, CoreError> {
    let mut interval = tokio::time::interval(plan.refresh);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    let mut deadline = pin!(tokio::time::sleep(plan.budget));
    let mut last = plan.baseline;

    let ended_by = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break SessionEnd::Stopped,
            () = &mut deadline => break SessionEnd::BudgetElapsed,
            _ = interval.tick() => inner.tick(&plan, &mut last),
        }
    };

    let result = inner.finish(&plan, ended_by);
    inner.state.send_replace(MonitorState::Idle);
    match &result {
        Ok(summary) => info!(
            id = %summary.entry.id,
            ended_by = %summary.ended_by,
            "monitoring stopped"
        ),
        Err(e) => error!(error = %e, "monitoring stopped but the session was not saved"),
    }
    result
}

impl EngineInner {
    fn tick(&self, plan: &SessionPlan, last: &mut Sample) {
        let counters = match self.source.sample_counters() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "sample failed, tick skipped");
                return;
            }
        };
        let sample = Sample::now(counters);

        let rate = compute_rate(last, &sample);
        if rate.is_none() {
            warn!("no time elapsed since previous sample, keeping last speed");
        }
        let transferred = sample.counters.since(&plan.baseline.counters);
        let connections = self.source.list_connections();

        self.stats.send_modify(|stats| {
            stats.bytes_in = stats.bytes_in.max(transferred.bytes_in);
            stats.bytes_out = stats.bytes_out.max(transferred.bytes_out);
            if let Some(rate) = rate {
                stats.apply_rate(rate);
            }
            stats.connections = connections;
        });
        *last = sample;

        debug!(
            bytes_in = transferred.bytes_in,
            bytes_out = transferred.bytes_out,
            "tick"
        );
    }

    fn finish(&self, plan: &SessionPlan, ended_by: SessionEnd) -> Result<SessionSummary, CoreError> {
        let transferred = {
            let stats = self.stats.borrow();
            Counters::new(stats.bytes_in, stats.bytes_out)
        };
        let elapsed = Instant::now().saturating_duration_since(plan.baseline.taken_at);
        let duration_seconds = u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX);

        let entry = self
            .store
            .append_history(HistoryEntry::record(transferred, duration_seconds))?;
        let alert = self.check_daily_cap()?;

        Ok(SessionSummary {
            entry,
            alert,
            ended_by,
        })
    }

    fn check_daily_cap(&self) -> Result<Option<Alert>, CoreError> {
        let settings = self.store.settings();
        let Some(cap) = settings.daily_cap_bytes else {
            return Ok(None);
        };
        let usage = self.aggregator.today().totals.total();
        self.evaluator
            .evaluate(usage, cap, settings.alert_thresholds)
    }
}
