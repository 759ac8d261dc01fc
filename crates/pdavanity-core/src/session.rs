//! A single search session: one cursor, one attempt counter, one result list

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pdavanity_crypto::{derive_program_address, Address};
use pdavanity_pattern::ConstraintMatcher;
use pdavanity_seeds::{SeedCursor, SeedTuple};

use crate::plan::SearchPlan;
use crate::progress::ProgressObserver;
use crate::search::StopHandle;
use crate::stats::SearchStats;

/// A matching derived address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub address: Address,
    pub bump: u8,
    pub seeds_used: SeedTuple,
    /// 1-based position of `seeds_used` in the enumeration order
    pub attempts_at_discovery: u64,
    pub elapsed_ms_at_discovery: u64,
    pub matched_constraint_names: Vec<String>,
}

/// Lifecycle of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchState {
    Idle,
    Running,
    /// Attempt limit reached
    Completed,
    Cancelled,
    /// Every combination explored
    Exhausted,
    /// Rejected by validation
    Failed,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchState::Idle | SearchState::Running)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchState::Idle => "idle",
            SearchState::Running => "running",
            SearchState::Completed => "completed",
            SearchState::Cancelled => "cancelled",
            SearchState::Exhausted => "exhausted",
            SearchState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a session stopped; none of these are errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    Completed,
    Cancelled,
    Exhausted,
}

impl StopReason {
    /// Message suitable for end users
    pub fn message(self) -> &'static str {
        match self {
            StopReason::Completed => "attempt limit reached; consider narrowing constraints",
            StopReason::Cancelled => "search stopped by user",
            StopReason::Exhausted => "explored the whole seed space",
        }
    }
}

impl From<StopReason> for SearchState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Completed => SearchState::Completed,
            StopReason::Cancelled => SearchState::Cancelled,
            StopReason::Exhausted => SearchState::Exhausted,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SearchState::from(*self).fmt(f)
    }
}

/// Runs the derive-and-match loop over a cursor
///
/// Each call to [`SearchSession::step`] processes one batch and returns, so a
/// host can interleave its own work between batches; [`SearchSession::run`]
/// loops until a terminal state.
pub struct SearchSession<'a> {
    plan: &'a SearchPlan,
    matcher: ConstraintMatcher,
    cursor: SeedCursor,
    stats: Arc<SearchStats>,
    stop: StopHandle,
    attempts: u64,
    limit: u64,
    results: Vec<SearchResult>,
    last_tuple: Option<SeedTuple>,
    last_report: Instant,
    state: SearchState,
    /// Part of a parallel search; the caller owns the shared stats
    worker: bool,
}

impl<'a> SearchSession<'a> {
    /// Session over the plan's whole seed space
    pub fn new(plan: &'a SearchPlan, stop: StopHandle) -> Self {
        Self::build(
            plan,
            plan.cursor(),
            SearchStats::new(),
            stop,
            plan.config.max_attempts,
            false,
        )
    }

    /// Session over a bounded slice of the seed space, counting into `stats`
    ///
    /// The cursor's bounds already enforce the attempt limit.
    pub(crate) fn worker(
        plan: &'a SearchPlan,
        cursor: SeedCursor,
        stats: Arc<SearchStats>,
        stop: StopHandle,
    ) -> Self {
        Self::build(plan, cursor, stats, stop, u64::MAX, true)
    }

    fn build(
        plan: &'a SearchPlan,
        cursor: SeedCursor,
        stats: Arc<SearchStats>,
        stop: StopHandle,
        limit: u64,
        worker: bool,
    ) -> Self {
        Self {
            plan,
            matcher: ConstraintMatcher::new(plan.constraints.clone()),
            cursor,
            stats,
            stop,
            attempts: 0,
            limit,
            results: Vec::new(),
            last_tuple: None,
            last_report: Instant::now(),
            state: SearchState::Idle,
            worker,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }

    pub fn stats(&self) -> &Arc<SearchStats> {
        &self.stats
    }

    /// Run batches until a terminal state
    pub fn run(&mut self, observer: &mut dyn ProgressObserver) -> StopReason {
        loop {
            if let Some(reason) = self.step(observer) {
                return reason;
            }
        }
    }

    /// Process one batch; `Some` once the session has stopped
    pub fn step(&mut self, observer: &mut dyn ProgressObserver) -> Option<StopReason> {
        if let Some(reason) = self.terminal_reason() {
            return Some(self.finish(reason, observer));
        }
        self.state = SearchState::Running;

        let budget = self.limit - self.attempts;
        let want = (self.plan.config.batch_size as u64).min(budget) as usize;
        let batch = self.cursor.next_batch(want);
        if batch.is_empty() {
            return Some(self.finish(StopReason::Exhausted, observer));
        }

        let first = self.cursor.position() - batch.len() as u128;
        let plan = self.plan;
        let config = &plan.config;
        let interval = Duration::from_millis(config.progress_interval_ms);

        for (offset, tuple) in batch.into_iter().enumerate() {
            self.attempts += 1;
            self.stats.add_attempts(1);
            self.process(first + offset as u128, tuple);

            if self.attempts % config.progress_every.max(1) == 0
                || self.last_report.elapsed() >= interval
            {
                self.report(observer);
            }
            if config.yield_every > 0 && self.attempts % config.yield_every == 0 {
                thread::yield_now();
            }
            if self.stop.is_stopped() {
                return Some(self.finish(StopReason::Cancelled, observer));
            }
        }

        self.terminal_reason()
            .map(|reason| self.finish(reason, observer))
    }

    fn terminal_reason(&self) -> Option<StopReason> {
        if let Some(reason) = self.finished_reason() {
            return Some(reason);
        }
        if self.stop.is_stopped() {
            Some(StopReason::Cancelled)
        } else if self.cursor.is_exhausted() {
            Some(StopReason::Exhausted)
        } else if self.attempts >= self.limit {
            Some(StopReason::Completed)
        } else {
            None
        }
    }

    fn finished_reason(&self) -> Option<StopReason> {
        match self.state {
            SearchState::Completed => Some(StopReason::Completed),
            SearchState::Cancelled => Some(StopReason::Cancelled),
            SearchState::Exhausted => Some(StopReason::Exhausted),
            _ => None,
        }
    }

    fn process(&mut self, ordinal: u128, tuple: SeedTuple) {
        match derive_program_address(tuple.seeds(), &self.plan.program_id) {
            Ok(derived) => {
                let text = derived.address.to_string();
                if self.matcher.is_match(&text) {
                    let outcome = self.matcher.matches(&text);
                    let attempts_at_discovery = ordinal as u64 + 1;
                    info!(
                        address = %text,
                        bump = derived.bump,
                        attempts = attempts_at_discovery,
                        "match found"
                    );
                    self.stats.add_match();
                    self.results.push(SearchResult {
                        address: derived.address,
                        bump: derived.bump,
                        seeds_used: tuple.clone(),
                        attempts_at_discovery,
                        elapsed_ms_at_discovery: self.stats.elapsed_ms(),
                        matched_constraint_names: outcome
                            .satisfied
                            .into_iter()
                            .map(String::from)
                            .collect(),
                    });
                }
            }
            Err(e) => {
                debug!(ordinal = ordinal as u64, error = %e, "skipping seed tuple");
                self.stats.add_skipped();
            }
        }
        self.last_tuple = Some(tuple);
    }

    fn report(&mut self, observer: &mut dyn ProgressObserver) {
        observer.on_progress(&self.stats.progress(self.last_tuple.clone()));
        self.last_report = Instant::now();
    }

    fn finish(&mut self, reason: StopReason, observer: &mut dyn ProgressObserver) -> StopReason {
        if !self.state.is_terminal() {
            self.state = reason.into();
            if !self.worker {
                self.stats.finish();
                self.report(observer);
            }
        }
        reason
    }
}
