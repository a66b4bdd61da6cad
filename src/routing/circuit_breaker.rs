//! Per-model circuit breakers
//!
//! Each model id owns one breaker record behind its own mutex, so reports for
//! different models never contend. The OPEN to HALF_OPEN transition is lazy:
//! it happens on the first query after the cooldown has elapsed, there is no
//! background timer.
//!
//! In HALF_OPEN exactly one trial request is admitted. The state, the failure
//! counter and the trial flag are updated together under the model's lock, so
//! concurrent queries can never admit a second trial and concurrent failure
//! reports can never open the breaker twice.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker
    pub failure_threshold: u32,
    /// Seconds an open breaker waits before admitting a trial
    pub cooldown_seconds: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_seconds: 60,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// Breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "CLOSED",
            BreakerState::Open => "OPEN",
            BreakerState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of one breaker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakerSnapshot {
    pub model_id: String,
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_transition_at: DateTime<Utc>,
    pub trial_in_flight: bool,
    /// Time left before an open breaker admits a trial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_remaining_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermitKind {
    Normal,
    /// Tagged with the epoch it was admitted in; a reset or a new
    /// HALF_OPEN entry invalidates older trials.
    Trial(u64),
}

#[derive(Debug)]
struct BreakerRecord {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    last_failure_at: Option<DateTime<Utc>>,
    last_transition_at: DateTime<Utc>,
    trial_in_flight: bool,
    epoch: u64,
}

impl BreakerRecord {
    fn new() -> Self {
        Self {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            last_failure_at: None,
            last_transition_at: Utc::now(),
            trial_in_flight: false,
            epoch: 0,
        }
    }

    fn transition(&mut self, model_id: &str, to: BreakerState, now: Instant) {
        let from = self.state;
        self.state = to;
        self.last_transition_at = Utc::now();
        self.trial_in_flight = false;
        self.epoch += 1;
        match to {
            BreakerState::Open => {
                self.opened_at = Some(now);
                tracing::warn!(
                    model_id,
                    from = %from,
                    failures = self.consecutive_failures,
                    "circuit breaker opened"
                );
            }
            BreakerState::HalfOpen => {
                tracing::info!(model_id, from = %from, "circuit breaker half-open, admitting trial");
            }
            BreakerState::Closed => {
                self.opened_at = None;
                self.consecutive_failures = 0;
                tracing::info!(model_id, from = %from, "circuit breaker closed");
            }
        }
        crate::metrics::record_breaker_transition(model_id, to);
    }

    /// Lazy OPEN -> HALF_OPEN once the cooldown has elapsed
    fn refresh(&mut self, model_id: &str, cooldown: Duration, now: Instant) {
        if self.state != BreakerState::Open {
            return;
        }
        let elapsed = self
            .opened_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or(cooldown);
        if elapsed >= cooldown {
            self.transition(model_id, BreakerState::HalfOpen, now);
        }
    }

    fn admits(&self) -> bool {
        match self.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => !self.trial_in_flight,
            BreakerState::Open => false,
        }
    }

    fn on_success(&mut self, model_id: &str, kind: PermitKind, now: Instant) {
        match kind {
            PermitKind::Trial(epoch) if epoch == self.epoch => {
                if self.state == BreakerState::HalfOpen {
                    self.transition(model_id, BreakerState::Closed, now);
                }
            }
            // A success admitted while CLOSED says nothing about a breaker
            // that has since opened.
            _ => {
                if self.state == BreakerState::Closed {
                    self.consecutive_failures = 0;
                }
            }
        }
    }

    fn on_failure(&mut self, model_id: &str, kind: PermitKind, threshold: u32, now: Instant) {
        // A trial from an earlier epoch was already judged by the reset or
        // transition that replaced it.
        if matches!(kind, PermitKind::Trial(epoch) if epoch != self.epoch) {
            return;
        }
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_failure_at = Some(Utc::now());
        match (kind, self.state) {
            (PermitKind::Trial(epoch), BreakerState::HalfOpen) if epoch == self.epoch => {
                self.transition(model_id, BreakerState::Open, now);
            }
            (_, BreakerState::Closed) if self.consecutive_failures >= threshold => {
                self.transition(model_id, BreakerState::Open, now);
            }
            _ => {}
        }
    }

    fn snapshot(&self, model_id: &str, cooldown: Duration, now: Instant) -> BreakerSnapshot {
        let cooldown_remaining_ms = match (self.state, self.opened_at) {
            (BreakerState::Open, Some(at)) => Some(
                cooldown
                    .saturating_sub(now.saturating_duration_since(at))
                    .as_millis() as u64,
            ),
            _ => None,
        };
        BreakerSnapshot {
            model_id: model_id.to_string(),
            state: self.state,
            consecutive_failures: self.consecutive_failures,
            last_failure_at: self.last_failure_at,
            last_transition_at: self.last_transition_at,
            trial_in_flight: self.trial_in_flight,
            cooldown_remaining_ms,
        }
    }
}

type SharedRecord = Arc<Mutex<BreakerRecord>>;

fn lock(record: &SharedRecord) -> MutexGuard<'_, BreakerRecord> {
    // Every update leaves the record consistent, so poisoning is ignored.
    record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registry of breakers keyed by model id.
///
/// Records are created CLOSED the first time a model id is seen.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, SharedRecord>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(&CircuitBreakerConfig::default())
    }
}

impl CircuitBreakerRegistry {
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            failure_threshold: config.failure_threshold.max(1),
            cooldown: config.cooldown(),
        }
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    fn record(&self, model_id: &str) -> SharedRecord {
        if let Some(existing) = self.breakers.get(model_id) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.breakers
                .entry(model_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(BreakerRecord::new())))
                .value(),
        )
    }

    /// Make sure a breaker exists for `model_id`.
    pub fn ensure(&self, model_id: &str) {
        self.record(model_id);
    }

    /// Whether the model may currently receive a request.
    ///
    /// Performs the lazy OPEN to HALF_OPEN transition. A HALF_OPEN breaker
    /// whose trial is in flight reports ineligible.
    pub fn is_eligible(&self, model_id: &str) -> bool {
        self.is_eligible_at(model_id, Instant::now())
    }

    pub fn is_eligible_at(&self, model_id: &str, now: Instant) -> bool {
        let record = self.record(model_id);
        let mut guard = lock(&record);
        guard.refresh(model_id, self.cooldown, now);
        guard.admits()
    }

    /// Admit one request to the model, or refuse it.
    ///
    /// In HALF_OPEN the first caller gets the trial and every other caller is
    /// refused until the trial resolves.
    pub fn try_acquire(&self, model_id: &str) -> Option<BreakerPermit> {
        self.try_acquire_at(model_id, Instant::now())
    }

    pub fn try_acquire_at(&self, model_id: &str, now: Instant) -> Option<BreakerPermit> {
        let record = self.record(model_id);
        let kind = {
            let mut guard = lock(&record);
            guard.refresh(model_id, self.cooldown, now);
            match guard.state {
                BreakerState::Closed => PermitKind::Normal,
                BreakerState::HalfOpen if !guard.trial_in_flight => {
                    guard.trial_in_flight = true;
                    tracing::debug!(model_id, "half-open trial admitted");
                    PermitKind::Trial(guard.epoch)
                }
                _ => return None,
            }
        };
        Some(BreakerPermit {
            model_id: model_id.to_string(),
            record,
            kind,
            failure_threshold: self.failure_threshold,
            resolved: false,
        })
    }

    /// Report a successful call made outside of a permit
    pub fn record_success(&self, model_id: &str) {
        let record = self.record(model_id);
        lock(&record).on_success(model_id, PermitKind::Normal, Instant::now());
    }

    /// Report a failed call made outside of a permit
    pub fn record_failure(&self, model_id: &str) {
        self.record_failure_at(model_id, Instant::now());
    }

    pub fn record_failure_at(&self, model_id: &str, now: Instant) {
        let record = self.record(model_id);
        lock(&record).on_failure(model_id, PermitKind::Normal, self.failure_threshold, now);
    }

    pub fn state(&self, model_id: &str) -> Option<BreakerState> {
        let record = self.breakers.get(model_id).map(|e| Arc::clone(e.value()))?;
        let state = lock(&record).state;
        Some(state)
    }

    pub fn snapshot(&self, model_id: &str) -> Option<BreakerSnapshot> {
        let record = self.breakers.get(model_id).map(|e| Arc::clone(e.value()))?;
        let guard = lock(&record);
        Some(guard.snapshot(model_id, self.cooldown, Instant::now()))
    }

    /// Snapshots of every breaker, sorted by model id
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let now = Instant::now();
        let records: Vec<(String, SharedRecord)> = self
            .breakers
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();
        let mut snapshots: Vec<BreakerSnapshot> = records
            .iter()
            .map(|(id, record)| lock(record).snapshot(id, self.cooldown, now))
            .collect();
        snapshots.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        snapshots
    }

    /// Number of breakers currently OPEN
    pub fn open_count(&self) -> usize {
        self.snapshots()
            .iter()
            .filter(|s| s.state == BreakerState::Open)
            .count()
    }

    /// Force a breaker back to CLOSED. Returns false for unknown models.
    pub fn reset(&self, model_id: &str) -> bool {
        let Some(record) = self.breakers.get(model_id).map(|e| Arc::clone(e.value())) else {
            return false;
        };
        let mut guard = lock(&record);
        if guard.state == BreakerState::Closed {
            guard.consecutive_failures = 0;
            guard.trial_in_flight = false;
            guard.epoch += 1;
        } else {
            guard.transition(model_id, BreakerState::Closed, Instant::now());
        }
        true
    }

    pub fn reset_all(&self) {
        let ids: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.reset(&id);
        }
    }

    /// Drop the breaker of a model that left the registry
    pub fn remove(&self, model_id: &str) -> bool {
        self.breakers.remove(model_id).is_some()
    }
}

/// Admission to call one model.
///
/// Resolve it with [`BreakerPermit::succeed`] or [`BreakerPermit::fail`].
/// Dropping it unresolved, for example because the caller was cancelled,
/// counts as a failure.
#[derive(Debug)]
#[must_use = "an unresolved permit reports a failure when dropped"]
pub struct BreakerPermit {
    model_id: String,
    record: SharedRecord,
    kind: PermitKind,
    failure_threshold: u32,
    resolved: bool,
}

impl BreakerPermit {
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Whether this permit is the single HALF_OPEN trial
    pub fn is_trial(&self) -> bool {
        matches!(self.kind, PermitKind::Trial(_))
    }

    pub fn succeed(mut self) {
        self.resolved = true;
        lock(&self.record).on_success(&self.model_id, self.kind, Instant::now());
    }

    pub fn fail(mut self) {
        self.resolved = true;
        self.report_failure();
    }

    fn report_failure(&self) {
        lock(&self.record).on_failure(
            &self.model_id,
            self.kind,
            self.failure_threshold,
            Instant::now(),
        );
    }
}

impl Drop for BreakerPermit {
    fn drop(&mut self) {
        if !self.resolved {
            tracing::debug!(model_id = %self.model_id, "permit dropped unresolved, counting as failure");
            self.report_failure();
        }
    }
}
