//! Live search statistics

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pdavanity_seeds::SeedTuple;

use crate::progress::SearchProgress;

/// Thread-safe search statistics
#[derive(Debug)]
pub struct SearchStats {
    /// Seed tuples tried, including skipped ones
    attempts: AtomicU64,
    /// Tuples whose derivation failed
    skipped: AtomicU64,
    /// Matches recorded
    matches: AtomicU64,
    start_time: Instant,
    running: AtomicBool,
}

impl SearchStats {
    /// Create new stats
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_attempts(&self, count: u64) {
        self.attempts.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_match(&self) {
        self.matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn matches(&self) -> u64 {
        self.matches.load(Ordering::Relaxed)
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn attempts_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts() as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Mark the session as no longer running
    pub fn finish(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Snapshot for observers
    pub fn progress(&self, current_seed_tuple: Option<SeedTuple>) -> SearchProgress {
        SearchProgress {
            attempts: self.total_attempts(),
            skipped: self.skipped(),
            elapsed_ms: self.elapsed_ms(),
            rate: self.attempts_per_second(),
            results_so_far: self.matches(),
            is_running: self.is_running(),
            current_seed_tuple,
        }
    }

    /// One-line status; see [`SearchProgress::format`]
    pub fn format(&self, difficulty: f64) -> String {
        self.progress(None).format(difficulty)
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            matches: AtomicU64::new(0),
            start_time: Instant::now(),
            running: AtomicBool::new(true),
        }
    }
}
