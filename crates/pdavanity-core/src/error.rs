//! Errors raised before a search starts

use pdavanity_crypto::EncodingError;
use pdavanity_pattern::ConstraintError;
use pdavanity_seeds::SeedError;
use thiserror::Error;

/// Rejected search input; the session never enters `Running`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid program id '{value}': {source}")]
    InvalidProgramId {
        value: String,
        source: EncodingError,
    },
    #[error("no seeds supplied; a search needs at least one seed")]
    NoSeeds,
    #[error("{count} seed specs supplied; a search allows at most {max} seeds")]
    TooManySeeds { count: usize, max: usize },
    #[error("seed {index}: {source}")]
    Seed { index: usize, source: SeedError },
    #[error("invalid constraints: {0}")]
    Constraints(#[from] ConstraintError),
    #[error("{field} must be at least 1")]
    ZeroLimit { field: &'static str },
}
