//! Input validation
//!
//! Everything a session needs, checked and encoded before any enumeration.

use tracing::warn;

use pdavanity_crypto::{Address, MAX_SEED_LEN};
use pdavanity_pattern::{estimate_space, Constraints, DifficultyEstimate};
use pdavanity_seeds::{SeedCursor, SeedDimension};

use crate::config::{SearchConfig, SearchOptions};
use crate::error::ValidationError;

/// Most seed specs a single search accepts
pub const MAX_SEARCH_SEEDS: usize = 8;

/// Validated search input
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub program_id: Address,
    pub dimensions: Vec<SeedDimension>,
    pub constraints: Constraints,
    /// Configuration with the options' overrides applied
    pub config: SearchConfig,
    /// Non-fatal problems found during validation
    pub warnings: Vec<String>,
}

impl SearchPlan {
    /// Validate `options`; fails fast on the first problem
    pub fn new(options: &SearchOptions, config: &SearchConfig) -> Result<Self, ValidationError> {
        let program_id = Address::from_base58(options.program_id.trim()).map_err(|source| {
            ValidationError::InvalidProgramId {
                value: options.program_id.clone(),
                source,
            }
        })?;

        if options.seeds.is_empty() {
            return Err(ValidationError::NoSeeds);
        }
        if options.seeds.len() > MAX_SEARCH_SEEDS {
            return Err(ValidationError::TooManySeeds {
                count: options.seeds.len(),
                max: MAX_SEARCH_SEEDS,
            });
        }

        let dimensions = options
            .seeds
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                SeedDimension::from_spec(spec).map_err(|source| ValidationError::Seed { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        options.constraints.validate()?;

        let config = options.resolve(config);
        if config.batch_size == 0 {
            return Err(ValidationError::ZeroLimit { field: "batchSize" });
        }
        if config.max_attempts == 0 {
            return Err(ValidationError::ZeroLimit { field: "maxAttempts" });
        }

        let mut warnings = options.constraints.warnings();
        for (index, dim) in dimensions.iter().enumerate() {
            if dim.max_len() > MAX_SEED_LEN {
                warnings.push(format!(
                    "seed {} is {} bytes (max {}); every derivation using it will be skipped",
                    index,
                    dim.max_len(),
                    MAX_SEED_LEN
                ));
            }
        }
        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(Self {
            program_id,
            dimensions,
            constraints: options.constraints.clone(),
            config,
            warnings,
        })
    }

    /// Size of the seed space
    pub fn total_combinations(&self) -> u128 {
        self.dimensions
            .iter()
            .fold(1u128, |acc, dim| acc.saturating_mul(dim.cardinality()))
    }

    /// Fresh cursor at the first combination
    pub fn cursor(&self) -> SeedCursor {
        SeedCursor::new(self.dimensions.clone())
    }

    /// Cursor over ordinals `start..end`
    pub fn cursor_range(&self, start: u128, end: u128) -> SeedCursor {
        SeedCursor::bounded(self.dimensions.clone(), start, end)
    }

    pub fn estimate(&self) -> DifficultyEstimate {
        let cardinalities = self.dimensions.iter().map(SeedDimension::cardinality);
        estimate_space(
            cardinalities
                .clone()
                .try_fold(1u128, |acc, cardinality| acc.checked_mul(cardinality)),
            cardinalities.map(|cardinality| cardinality as f64).product(),
            &self.constraints,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdavanity_seeds::{IntegerWidth, SeedEncoding, SeedError, SeedSpec};

    const PROGRAM: &str = "11111111111111111111111111111111";

    fn plan(seeds: Vec<SeedSpec>) -> Result<SearchPlan, ValidationError> {
        SearchPlan::new(
            &SearchOptions::new(PROGRAM, seeds, Constraints::prefix("A")),
            &SearchConfig::default(),
        )
    }

    #[test]
    fn test_valid_plan() {
        let plan = plan(vec![
            SeedSpec::string("vault"),
            SeedSpec::range(IntegerWidth::U16, 0, 999),
        ])
        .unwrap();
        assert_eq!(plan.total_combinations(), 1000);
        assert_eq!(plan.dimensions[0], SeedDimension::Fixed(b"vault".to_vec()));
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_invalid_program_id() {
        for bad in ["", "test", "0OIl"] {
            let err = SearchPlan::new(
                &SearchOptions::new(bad, vec![SeedSpec::string("a")], Constraints::default()),
                &SearchConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, ValidationError::InvalidProgramId { .. }));
        }
    }

    #[test]
    fn test_seed_count_bounds() {
        assert_eq!(plan(vec![]).unwrap_err(), ValidationError::NoSeeds);

        let nine = vec![SeedSpec::string("s"); 9];
        let err = plan(nine).unwrap_err();
        assert_eq!(err, ValidationError::TooManySeeds { count: 9, max: 8 });
        assert!(err.to_string().contains("at most 8 seeds"));

        assert!(plan(vec![SeedSpec::string("s"); 8]).is_ok());
    }

    #[test]
    fn test_bad_range_names_seed_index() {
        let err = plan(vec![
            SeedSpec::string("vault"),
            SeedSpec::range(IntegerWidth::U8, 10, 5),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Seed {
                index: 1,
                source: SeedError::MinExceedsMax { min: 10, max: 5 }
            }
        );
        assert_eq!(err.to_string(), "seed 1: range min > max (10 > 5)");
    }

    #[test]
    fn test_missing_literal_value() {
        let err = plan(vec![SeedSpec::Literal {
            encoding: SeedEncoding::String,
            value: None,
        }])
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Seed {
                index: 0,
                source: SeedError::MissingValue
            }
        );
    }

    #[test]
    fn test_zero_limits_rejected() {
        let options = SearchOptions::new(PROGRAM, vec![SeedSpec::string("a")], Constraints::default());
        let err = SearchPlan::new(&options.clone().with_max_attempts(0), &SearchConfig::default());
        assert_eq!(err.unwrap_err(), ValidationError::ZeroLimit { field: "maxAttempts" });
        let err = SearchPlan::new(&options.with_batch_size(0), &SearchConfig::default());
        assert_eq!(err.unwrap_err(), ValidationError::ZeroLimit { field: "batchSize" });
    }

    #[test]
    fn test_oversized_literal_warns() {
        let plan = plan(vec![SeedSpec::string("x".repeat(40))]).unwrap();
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("seed 0 is 40 bytes"));
    }
}
