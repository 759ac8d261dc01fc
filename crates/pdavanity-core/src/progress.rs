//! Progress reporting

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use pdavanity_pattern::{format_count, format_duration};
use pdavanity_seeds::SeedTuple;

/// Periodic snapshot of a running search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProgress {
    pub attempts: u64,
    /// Attempts whose derivation failed and were skipped
    pub skipped: u64,
    pub elapsed_ms: u64,
    /// Attempts per second
    pub rate: f64,
    pub results_so_far: u64,
    pub is_running: bool,
    pub current_seed_tuple: Option<SeedTuple>,
}

impl SearchProgress {
    /// One-line status for a terminal progress line
    ///
    /// `difficulty` is the expected number of attempts per match.
    pub fn format(&self, difficulty: f64) -> String {
        // Chance of at least one match so far
        let prob = if difficulty > 0.0 {
            1.0 - (-(self.attempts as f64) / difficulty).exp()
        } else {
            0.0
        };

        // Time until 50% chance of a match
        let remaining_for_50 = if prob < 0.5 && self.rate > 0.0 {
            (difficulty * std::f64::consts::LN_2 - self.attempts as f64) / self.rate
        } else {
            0.0
        };

        format!(
            "[{:.0} att/s][Total {}][Found {}][Prob {:.1}%][50% in {}]",
            self.rate,
            format_count(self.attempts),
            self.results_so_far,
            prob * 100.0,
            if remaining_for_50 > 0.0 {
                format_duration(remaining_for_50)
            } else {
                "now".to_string()
            }
        )
    }
}

/// Receives progress snapshots from the search loop
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &SearchProgress);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&SearchProgress),
{
    fn on_progress(&mut self, progress: &SearchProgress) {
        self(progress)
    }
}

/// Discards every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _progress: &SearchProgress) {}
}

/// Forwards snapshots into a bounded queue the host drains
///
/// When the queue is full the snapshot is dropped; the next one carries
/// newer numbers anyway.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<SearchProgress>,
}

impl ChannelObserver {
    pub fn new(capacity: usize) -> (Self, Receiver<SearchProgress>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&mut self, progress: &SearchProgress) {
        let _ = self.tx.try_send(progress.clone());
    }
}
