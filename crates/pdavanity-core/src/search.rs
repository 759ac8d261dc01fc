//! PDA search controller

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use pdavanity_pattern::{estimate_space, Constraints, DifficultyEstimate};
use pdavanity_seeds::{approx_total_combinations, checked_total_combinations, SeedSpec};

use crate::config::{SearchConfig, SearchOptions};
use crate::error::ValidationError;
use crate::plan::SearchPlan;
use crate::progress::{NoProgress, ProgressObserver};
use crate::session::{SearchResult, SearchSession, SearchState, StopReason};
use crate::stats::SearchStats;

/// Requests cancellation of a running search from outside its loop
///
/// Takes effect at the next check, after the current seed tuple.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Final state of a search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub reason: StopReason,
    /// Matches in enumeration order
    pub results: Vec<SearchResult>,
    pub attempts: u64,
    /// Attempts whose derivation failed
    pub skipped: u64,
    pub elapsed_ms: u64,
    pub warnings: Vec<String>,
}

/// Validates input and drives search sessions
pub struct SearchController {
    config: SearchConfig,
    stop: StopHandle,
    state: SearchState,
}

impl SearchController {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            stop: StopHandle::new(),
            state: SearchState::Idle,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Handle for cancelling searches run by this controller
    ///
    /// A stop requested before a search starts is cleared when it starts.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    fn prepare(&mut self, options: &SearchOptions) -> Result<SearchPlan, ValidationError> {
        self.stop.reset();
        match SearchPlan::new(options, &self.config) {
            Ok(plan) => {
                self.state = SearchState::Running;
                Ok(plan)
            }
            Err(e) => {
                warn!("search rejected: {}", e);
                self.state = SearchState::Failed;
                Err(e)
            }
        }
    }

    /// Run a single-threaded search until it completes, exhausts the seed
    /// space or is stopped
    pub fn search(
        &mut self,
        options: &SearchOptions,
        observer: &mut dyn ProgressObserver,
    ) -> Result<SearchOutcome, ValidationError> {
        let plan = self.prepare(options)?;
        info!(
            program_id = %plan.program_id,
            seeds = plan.dimensions.len(),
            combinations = %plan.total_combinations(),
            max_attempts = plan.config.max_attempts,
            "starting PDA search"
        );

        let mut session = SearchSession::new(&plan, self.stop.clone());
        let reason = session.run(observer);
        let stats = Arc::clone(session.stats());

        Ok(self.conclude(reason, session.into_results(), &stats, plan.warnings))
    }

    /// Run the search on a thread pool
    ///
    /// The explored ordinals are split into contiguous chunks, so the merged
    /// results are identical to [`SearchController::search`]. Progress is
    /// polled from the calling thread.
    pub fn search_parallel(
        &mut self,
        options: &SearchOptions,
        observer: &mut dyn ProgressObserver,
    ) -> Result<SearchOutcome, ValidationError> {
        let plan = self.prepare(options)?;

        let num_threads = if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        };
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!("thread pool unavailable ({}), searching on one thread", e);
                let mut session = SearchSession::new(&plan, self.stop.clone());
                let reason = session.run(observer);
                let stats = Arc::clone(session.stats());
                return Ok(self.conclude(reason, session.into_results(), &stats, plan.warnings));
            }
        };

        let total = plan.total_combinations();
        let explored = total.min(plan.config.max_attempts as u128);
        let chunk = (explored / (num_threads as u128 * 4))
            .max(plan.config.batch_size as u128)
            .max(1);
        let chunks: Vec<(u128, u128)> = (0..explored)
            .step_by(chunk as usize)
            .map(|start| (start, (start + chunk).min(explored)))
            .collect();

        info!(
            program_id = %plan.program_id,
            threads = num_threads,
            chunks = chunks.len(),
            combinations = %total,
            "starting parallel PDA search"
        );

        let stats = SearchStats::new();
        let poll = Duration::from_millis(plan.config.progress_interval_ms.clamp(1, 100));

        let worker_results = thread::scope(|scope| {
            let handle = scope.spawn(|| {
                pool.install(|| {
                    chunks
                        .par_iter()
                        .map(|&(start, end)| {
                            let mut session = SearchSession::worker(
                                &plan,
                                plan.cursor_range(start, end),
                                Arc::clone(&stats),
                                self.stop.clone(),
                            );
                            let reason = session.run(&mut NoProgress);
                            (reason, session.into_results())
                        })
                        .collect::<Vec<_>>()
                })
            });

            while !handle.is_finished() {
                observer.on_progress(&stats.progress(None));
                thread::sleep(poll);
            }
            handle.join()
        });
        let worker_results = match worker_results {
            Ok(results) => results,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        let cancelled = worker_results
            .iter()
            .any(|(reason, _)| *reason == StopReason::Cancelled);
        let reason = if cancelled {
            StopReason::Cancelled
        } else if explored < total {
            StopReason::Completed
        } else {
            StopReason::Exhausted
        };
        let results = worker_results
            .into_iter()
            .flat_map(|(_, results)| results)
            .collect();

        stats.finish();
        observer.on_progress(&stats.progress(None));

        Ok(self.conclude(reason, results, &stats, plan.warnings))
    }

    fn conclude(
        &mut self,
        reason: StopReason,
        results: Vec<SearchResult>,
        stats: &SearchStats,
        warnings: Vec<String>,
    ) -> SearchOutcome {
        self.state = reason.into();
        let outcome = SearchOutcome {
            reason,
            results,
            attempts: stats.total_attempts(),
            skipped: stats.skipped(),
            elapsed_ms: stats.elapsed_ms(),
            warnings,
        };
        info!(
            reason = %reason,
            attempts = outcome.attempts,
            skipped = outcome.skipped,
            matches = outcome.results.len(),
            elapsed_ms = outcome.elapsed_ms,
            "PDA search finished: {}",
            reason.message()
        );
        outcome
    }
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// Run a search with the default configuration
pub fn search(
    options: &SearchOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<SearchOutcome, ValidationError> {
    SearchController::default().search(options, observer)
}

/// Estimate search size and duration without validating or running anything
pub fn estimate_difficulty(seeds: &[SeedSpec], constraints: &Constraints) -> DifficultyEstimate {
    estimate_space(
        checked_total_combinations(seeds),
        approx_total_combinations(seeds),
        constraints,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdavanity_crypto::{derive_program_address, Address};
    use pdavanity_pattern::DifficultyTier;
    use pdavanity_seeds::IntegerWidth;

    use crate::plan::MAX_SEARCH_SEEDS;
    use crate::progress::SearchProgress;

    fn all_ones() -> String {
        Address::new([1u8; 32]).to_string()
    }

    fn run(options: &SearchOptions) -> SearchOutcome {
        SearchController::default()
            .search(options, &mut NoProgress)
            .unwrap()
    }

    #[test]
    fn test_single_literal_unconstrained() {
        let seeds = vec![SeedSpec::string("test")];
        let options = SearchOptions::new(all_ones(), seeds.clone(), Constraints::default());

        let outcome = run(&options);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.reason, StopReason::Exhausted);
        assert_eq!(outcome.results[0].matched_constraint_names, vec!["unconstrained"]);
        assert!(!outcome.warnings.is_empty());

        let est = estimate_difficulty(&seeds, &Constraints::default());
        assert_eq!(est.tier, DifficultyTier::Easy);
    }

    #[test]
    fn test_range_prefix_explores_every_tuple() {
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U8, 0, 9)],
            Constraints::prefix("A"),
        );

        let outcome = run(&options);
        assert_eq!(outcome.attempts, 10);
        assert_eq!(outcome.reason, StopReason::Exhausted);
        for result in &outcome.results {
            assert!(result.address.to_string().to_lowercase().starts_with('a'));
            assert_eq!(result.matched_constraint_names, vec!["prefix"]);
        }
    }

    #[test]
    fn test_nine_seeds_rejected() {
        let mut controller = SearchController::default();
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::string("s"); 9],
            Constraints::default(),
        );
        let err = controller.search(&options, &mut NoProgress).unwrap_err();
        assert!(err.to_string().contains("at most 8 seeds"));
        assert_eq!(controller.state(), SearchState::Failed);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U8, 10, 5)],
            Constraints::default(),
        );
        let err = search(&options, &mut NoProgress).unwrap_err();
        assert!(err.to_string().contains("min > max"));
    }

    #[test]
    fn test_attempt_limit_completes() {
        // '0' never appears in Base58, so nothing can match
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U16, 0, 999)],
            Constraints::prefix("0"),
        )
        .with_max_attempts(50);

        let mut controller = SearchController::default();
        let outcome = controller.search(&options, &mut NoProgress).unwrap();
        assert_eq!(outcome.reason, StopReason::Completed);
        assert_eq!(outcome.attempts, 50);
        assert!(outcome.results.is_empty());
        assert_eq!(controller.state(), SearchState::Completed);
    }

    #[test]
    fn test_results_rederive_and_stay_ordered() {
        let program_id = all_ones();
        let options = SearchOptions::new(
            program_id.clone(),
            vec![
                SeedSpec::string("vault"),
                SeedSpec::range(IntegerWidth::U16, 0, 299),
            ],
            Constraints::contains("a"),
        );

        let outcome = run(&options);
        assert_eq!(outcome.attempts, 300);
        assert!(!outcome.results.is_empty());

        let program: Address = program_id.parse().unwrap();
        let mut previous = 0;
        for result in &outcome.results {
            let derived = derive_program_address(result.seeds_used.seeds(), &program).unwrap();
            assert_eq!(derived.address, result.address);
            assert_eq!(derived.bump, result.bump);
            assert!(result.attempts_at_discovery > previous);
            previous = result.attempts_at_discovery;
        }
    }

    #[test]
    fn test_progress_reported_and_final_snapshot() {
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U16, 0, 349)],
            Constraints::prefix("0"),
        );

        let mut snapshots: Vec<SearchProgress> = Vec::new();
        let mut observer = |p: &SearchProgress| snapshots.push(p.clone());
        let outcome = SearchController::default()
            .search(&options, &mut observer)
            .unwrap();
        assert_eq!(outcome.attempts, 350);

        let counts: Vec<u64> = snapshots.iter().map(|p| p.attempts).collect();
        for expected in [100, 200, 300] {
            assert!(counts.contains(&expected));
        }
        let last = snapshots.last().unwrap();
        assert!(!last.is_running);
        assert_eq!(last.attempts, 350);
        assert!(snapshots.windows(2).all(|w| w[0].attempts <= w[1].attempts));
    }

    #[test]
    fn test_progress_reported_on_interval() {
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U8, 0, 49)],
            Constraints::prefix("0"),
        );

        // Count never triggers; a zero interval reports after every tuple
        let mut controller = SearchController::new(SearchConfig {
            progress_every: 10_000,
            progress_interval_ms: 0,
            ..Default::default()
        });
        let mut snapshots: Vec<SearchProgress> = Vec::new();
        let mut observer = |p: &SearchProgress| snapshots.push(p.clone());
        let outcome = controller.search(&options, &mut observer).unwrap();
        assert_eq!(outcome.attempts, 50);

        let running: Vec<u64> = snapshots
            .iter()
            .filter(|p| p.is_running)
            .map(|p| p.attempts)
            .collect();
        assert_eq!(running, (1..=50).collect::<Vec<u64>>());
        assert!(!snapshots.last().unwrap().is_running);
    }

    #[test]
    fn test_no_progress_before_count_or_interval() {
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U8, 0, 49)],
            Constraints::prefix("0"),
        );

        let mut controller = SearchController::new(SearchConfig {
            progress_every: 10_000,
            progress_interval_ms: 3_600_000,
            ..Default::default()
        });
        let mut snapshots: Vec<SearchProgress> = Vec::new();
        let mut observer = |p: &SearchProgress| snapshots.push(p.clone());
        controller.search(&options, &mut observer).unwrap();

        // Only the final snapshot
        assert_eq!(snapshots.len(), 1);
        assert!(!snapshots[0].is_running);
        assert_eq!(snapshots[0].attempts, 50);
    }

    #[test]
    fn test_stop_cancels_within_a_tuple() {
        let mut controller = SearchController::new(SearchConfig {
            batch_size: 1000,
            ..Default::default()
        });
        let stop = controller.stop_handle();
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U32, 0, 99_999)],
            Constraints::default(),
        );

        let mut observer = |p: &SearchProgress| {
            if p.attempts >= 100 {
                stop.stop();
            }
        };
        let outcome = controller.search(&options, &mut observer).unwrap();

        // Stopped right after the tuple that triggered the report
        assert_eq!(outcome.reason, StopReason::Cancelled);
        assert_eq!(outcome.attempts, 100);
        assert_eq!(outcome.results.len(), 100);
        assert_eq!(controller.state(), SearchState::Cancelled);
    }

    #[test]
    fn test_step_by_step_session() {
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U16, 0, 24)],
            Constraints::prefix("0"),
        )
        .with_batch_size(10);
        let plan = SearchPlan::new(&options, &SearchConfig::default()).unwrap();
        let mut session = SearchSession::new(&plan, StopHandle::new());

        assert_eq!(session.state(), SearchState::Idle);
        assert_eq!(session.step(&mut NoProgress), None);
        assert_eq!(session.attempts(), 10);
        assert_eq!(session.state(), SearchState::Running);
        assert_eq!(session.step(&mut NoProgress), None);
        assert_eq!(session.step(&mut NoProgress), Some(StopReason::Exhausted));
        assert_eq!(session.attempts(), 25);
        assert_eq!(session.step(&mut NoProgress), Some(StopReason::Exhausted));
        assert_eq!(session.attempts(), 25);
    }

    #[test]
    fn test_oversized_seed_is_skipped_not_fatal() {
        let options = SearchOptions::new(
            all_ones(),
            vec![
                SeedSpec::string("x".repeat(33)),
                SeedSpec::range(IntegerWidth::U8, 0, 4),
            ],
            Constraints::default(),
        );
        let outcome = run(&options);
        assert_eq!(outcome.reason, StopReason::Exhausted);
        assert_eq!(outcome.attempts, 5);
        assert_eq!(outcome.skipped, 5);
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let options = SearchOptions::new(
            all_ones(),
            vec![
                SeedSpec::range(IntegerWidth::U8, 0, 19),
                SeedSpec::range(IntegerWidth::U16, 0, 99),
            ],
            Constraints::prefix("b"),
        )
        .with_batch_size(64);

        let sequential = run(&options);
        let parallel = SearchController::new(SearchConfig {
            threads: 4,
            ..Default::default()
        })
        .search_parallel(&options, &mut NoProgress)
        .unwrap();

        assert_eq!(parallel.reason, StopReason::Exhausted);
        assert_eq!(parallel.attempts, 2000);
        let key = |r: &SearchResult| {
            (r.address, r.bump, r.seeds_used.clone(), r.attempts_at_discovery)
        };
        assert!(!sequential.results.is_empty());
        assert_eq!(
            parallel.results.iter().map(key).collect::<Vec<_>>(),
            sequential.results.iter().map(key).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_parallel_stop_cancels() {
        let mut controller = SearchController::new(SearchConfig {
            threads: 2,
            ..Default::default()
        });
        let stop = controller.stop_handle();
        let options = SearchOptions::new(
            all_ones(),
            vec![
                SeedSpec::range(IntegerWidth::U32, 0, 99_999),
                SeedSpec::range(IntegerWidth::U8, 0, 9),
            ],
            Constraints::default(),
        );

        let mut observer = |p: &SearchProgress| {
            if p.attempts >= 500 {
                stop.stop();
            }
        };
        let outcome = controller.search_parallel(&options, &mut observer).unwrap();

        assert_eq!(outcome.reason, StopReason::Cancelled);
        assert!(outcome.attempts >= 500);
        assert!(outcome.attempts < 1_000_000);
        // Unconstrained: every attempt before the stop was recorded
        assert_eq!(outcome.results.len() as u64, outcome.attempts);
        assert_eq!(controller.state(), SearchState::Cancelled);
    }

    #[test]
    fn test_estimate_flags_space_past_u128() {
        let seeds = vec![SeedSpec::range(IntegerWidth::U32, 0, 99_999); MAX_SEARCH_SEEDS];
        let est = estimate_difficulty(&seeds, &Constraints::default());
        assert!(est.combinations_saturated);
        assert_eq!(est.total_combinations, u128::MAX);
        assert!((est.effective_difficulty / 1e40 - 1.0).abs() < 1e-9);
        assert_eq!(est.tier, DifficultyTier::Extreme);

        let options = SearchOptions::new(all_ones(), seeds, Constraints::prefix("A"));
        let plan = SearchPlan::new(&options, &SearchConfig::default()).unwrap();
        assert!(plan.estimate().combinations_saturated);
        assert_eq!(plan.estimate().effective_difficulty, 58.0);
    }

    #[test]
    fn test_parallel_respects_attempt_limit() {
        let options = SearchOptions::new(
            all_ones(),
            vec![SeedSpec::range(IntegerWidth::U16, 0, 9_999)],
            Constraints::prefix("0"),
        )
        .with_max_attempts(777)
        .with_batch_size(50);

        let outcome = SearchController::new(SearchConfig {
            threads: 3,
            ..Default::default()
        })
        .search_parallel(&options, &mut NoProgress)
        .unwrap();
        assert_eq!(outcome.reason, StopReason::Completed);
        assert_eq!(outcome.attempts, 777);
    }
}
