//! Search configuration and caller options

use serde::{Deserialize, Serialize};

use pdavanity_pattern::Constraints;
use pdavanity_seeds::SeedSpec;

/// Search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Tuples pulled from the enumerator per batch
    pub batch_size: usize,
    /// Hard cap on attempts per session
    pub max_attempts: u64,
    /// Yield to the scheduler after this many attempts (0 = never)
    pub yield_every: u64,
    /// Report progress after this many attempts
    pub progress_every: u64,
    /// Report progress at least this often while running
    pub progress_interval_ms: u64,
    /// Worker threads for parallel search (0 = auto)
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_attempts: 1_000_000,
            yield_every: 100,
            progress_every: 100,
            progress_interval_ms: 1000,
            threads: 0, // Auto-detect
        }
    }
}

/// What to search for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Base58 program identifier
    pub program_id: String,
    pub seeds: Vec<SeedSpec>,
    #[serde(default)]
    pub constraints: Constraints,
    /// Overrides `SearchConfig::max_attempts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u64>,
    /// Overrides `SearchConfig::batch_size`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

impl SearchOptions {
    pub fn new(program_id: impl Into<String>, seeds: Vec<SeedSpec>, constraints: Constraints) -> Self {
        Self {
            program_id: program_id.into(),
            seeds,
            constraints,
            max_attempts: None,
            batch_size: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// `config` with this search's overrides applied
    pub fn resolve(&self, config: &SearchConfig) -> SearchConfig {
        SearchConfig {
            batch_size: self.batch_size.unwrap_or(config.batch_size),
            max_attempts: self.max_attempts.unwrap_or(config.max_attempts),
            ..config.clone()
        }
    }
}
