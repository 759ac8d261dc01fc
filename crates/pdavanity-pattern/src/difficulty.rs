//! Difficulty estimation for PDA searches

use serde::{Deserialize, Serialize};

use crate::Constraints;

/// Approximate number of distinct characters per address position
pub const ADDRESS_ALPHABET_SIZE: f64 = 58.0;

/// Derivations per second assumed for time estimates
pub const ASSUMED_RATE: f64 = 1000.0;

/// Coarse expectation of how long a search will take
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    VeryHard,
    Extreme,
}

impl DifficultyTier {
    /// Classify an estimated duration; lower bounds inclusive
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds < 1.0 {
            DifficultyTier::Easy
        } else if seconds < 10.0 {
            DifficultyTier::Medium
        } else if seconds < 300.0 {
            DifficultyTier::Hard
        } else if seconds < 3600.0 {
            DifficultyTier::VeryHard
        } else {
            DifficultyTier::Extreme
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Medium => "Medium",
            DifficultyTier::Hard => "Hard",
            DifficultyTier::VeryHard => "Very Hard",
            DifficultyTier::Extreme => "Extreme",
        }
    }
}

/// Static estimate of a search's size and duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyEstimate {
    /// Product of every seed's cardinality, saturating at `u128::MAX`
    pub total_combinations: u128,
    /// The true product exceeds `u128::MAX`; `total_combinations` is a floor
    pub combinations_saturated: bool,
    /// Expected attempts implied by the string constraints alone
    pub constraint_difficulty: f64,
    /// `min(total_combinations, constraint_difficulty)`
    pub effective_difficulty: f64,
    pub estimated_seconds: f64,
    pub tier: DifficultyTier,
}

/// `58^L`, where `L` is the combined length of prefix, suffix and contains
pub fn constraint_difficulty(constraints: &Constraints) -> f64 {
    let pattern_len: usize = [
        &constraints.prefix,
        &constraints.suffix,
        &constraints.contains,
    ]
    .into_iter()
    .flatten()
    .map(|s| s.chars().count())
    .sum();

    ADDRESS_ALPHABET_SIZE.powi(pattern_len as i32)
}

impl DifficultyEstimate {
    /// Exact combination count, or a lower bound when it overflowed
    pub fn combinations_label(&self) -> String {
        if self.combinations_saturated {
            format!("> {:.2e}", u128::MAX as f64)
        } else {
            self.total_combinations.to_string()
        }
    }
}

/// Estimate the cost of searching `total_combinations` seed tuples
pub fn estimate(total_combinations: u128, constraints: &Constraints) -> DifficultyEstimate {
    estimate_space(Some(total_combinations), total_combinations as f64, constraints)
}

/// Estimate for a seed space whose size may not fit in `u128`
///
/// `exact` is `None` when the product overflowed; `approx` carries the size
/// either way and drives the time estimate.
pub fn estimate_space(
    exact: Option<u128>,
    approx: f64,
    constraints: &Constraints,
) -> DifficultyEstimate {
    let constraint_difficulty = constraint_difficulty(constraints);
    let effective_difficulty = approx.min(constraint_difficulty);
    let estimated_seconds = effective_difficulty / ASSUMED_RATE;

    DifficultyEstimate {
        total_combinations: exact.unwrap_or(u128::MAX),
        combinations_saturated: exact.is_none(),
        constraint_difficulty,
        effective_difficulty,
        estimated_seconds,
        tier: DifficultyTier::from_seconds(estimated_seconds),
    }
}

/// Format difficulty as human-readable string
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.0}", difficulty)
    }
}

/// Format an attempt count with a K/M/G/T suffix
pub fn format_count(count: u64) -> String {
    if count >= 1000 {
        format_difficulty(count as f64)
    } else {
        count.to_string()
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else if seconds < 86400.0 * 365.0 {
        format!("{:.1}d", seconds / 86400.0)
    } else {
        format!("{:.1}y", seconds / (86400.0 * 365.0))
    }
}
