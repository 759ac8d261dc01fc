//! PdaVanity Core Engine
//!
//! Batched, cancellable search for program-derived addresses whose Base58
//! text satisfies a set of constraints.

mod config;
mod error;
mod plan;
mod progress;
mod search;
mod session;
mod stats;

pub use config::{SearchConfig, SearchOptions};
pub use error::ValidationError;
pub use plan::{SearchPlan, MAX_SEARCH_SEEDS};
pub use progress::{ChannelObserver, NoProgress, ProgressObserver, SearchProgress};
pub use search::{estimate_difficulty, search, SearchController, SearchOutcome, StopHandle};
pub use session::{SearchResult, SearchSession, SearchState, StopReason};
pub use stats::SearchStats;

// Re-exports for convenience
pub use pdavanity_crypto::{
    create_program_address, derive_program_address, Address, DerivedAddress, PdaError,
};
pub use pdavanity_pattern::{
    constraint_difficulty, format_count, format_difficulty, format_duration, ConstraintMatcher,
    Constraints, DifficultyEstimate, DifficultyTier, MatchOutcome,
};
pub use pdavanity_seeds::{
    encode_integer, encode_literal, encode_text, IntegerWidth, SeedCursor, SeedDimension,
    SeedEncoding, SeedSpec, SeedTuple, SeedValue,
};
