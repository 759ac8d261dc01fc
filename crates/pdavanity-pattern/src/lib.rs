//! PdaVanity Pattern Matching Engine
//!
//! Address constraints (prefix, suffix, contains, length, exclusions) and
//! search difficulty estimation.

mod difficulty;
mod matcher;

pub use difficulty::{
    constraint_difficulty, estimate, estimate_space, format_count, format_difficulty, format_duration,
    DifficultyEstimate, DifficultyTier, ADDRESS_ALPHABET_SIZE, ASSUMED_RATE,
};
pub use matcher::{
    ConstraintError, ConstraintKind, ConstraintMatcher, Constraints, MatchOutcome,
    BASE58_ALPHABET, UNCONSTRAINED,
};
