//! Seed specification types

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest number of values a single range seed may cover
pub const MAX_RANGE_CARDINALITY: u64 = 100_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("range min > max ({min} > {max})")]
    MinExceedsMax { min: u64, max: u64 },
    #[error("range covers {cardinality} values (max {max})")]
    RangeTooLarge { cardinality: u128, max: u64 },
    #[error("range max {max} does not fit in {width} byte(s)")]
    ValueExceedsWidth { max: u64, width: usize },
    #[error("literal seed has no value")]
    MissingValue,
    #[error("cannot encode literal as {encoding}: {reason}")]
    InvalidLiteral {
        encoding: SeedEncoding,
        reason: String,
    },
}

/// Byte width of an integer seed, always little-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IntegerWidth {
    U8,
    U16,
    U32,
    U64,
}

impl IntegerWidth {
    pub fn bytes(self) -> usize {
        match self {
            IntegerWidth::U8 => 1,
            IntegerWidth::U16 => 2,
            IntegerWidth::U32 => 4,
            IntegerWidth::U64 => 8,
        }
    }

    /// Largest value representable in this width
    pub fn max_value(self) -> u64 {
        match self {
            IntegerWidth::U8 => u8::MAX as u64,
            IntegerWidth::U16 => u16::MAX as u64,
            IntegerWidth::U32 => u32::MAX as u64,
            IntegerWidth::U64 => u64::MAX,
        }
    }

    /// Smallest width that holds `value`
    pub fn smallest_for(value: u64) -> Self {
        if value <= u8::MAX as u64 {
            IntegerWidth::U8
        } else if value <= u16::MAX as u64 {
            IntegerWidth::U16
        } else if value <= u32::MAX as u64 {
            IntegerWidth::U32
        } else {
            IntegerWidth::U64
        }
    }
}

impl TryFrom<u8> for IntegerWidth {
    type Error = String;

    fn try_from(bytes: u8) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(IntegerWidth::U8),
            2 => Ok(IntegerWidth::U16),
            4 => Ok(IntegerWidth::U32),
            8 => Ok(IntegerWidth::U64),
            other => Err(format!("integer width must be 1, 2, 4 or 8 bytes, got {}", other)),
        }
    }
}

impl From<IntegerWidth> for u8 {
    fn from(width: IntegerWidth) -> Self {
        width.bytes() as u8
    }
}

impl fmt::Display for IntegerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bytes() * 8)
    }
}

/// How a literal seed value is turned into bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedEncoding {
    /// UTF-8 bytes of the text
    String,
    /// Base58 text that must decode to a 32-byte address
    Address,
    /// Raw bytes, given as an array or as hex text
    Bytes,
    /// Little-endian integer in the smallest 1/2/4/8-byte width
    Integer,
    /// Address bytes when the text decodes to 32 bytes, otherwise UTF-8
    #[default]
    Auto,
}

impl fmt::Display for SeedEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeedEncoding::String => "string",
            SeedEncoding::Address => "address",
            SeedEncoding::Bytes => "bytes",
            SeedEncoding::Integer => "integer",
            SeedEncoding::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// A literal seed value as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    Integer(u64),
    Text(String),
    Bytes(Vec<u8>),
}

/// One seed position of a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SeedSpec {
    /// The same value in every combination
    Literal {
        #[serde(default)]
        encoding: SeedEncoding,
        #[serde(default)]
        value: Option<SeedValue>,
    },
    /// Every integer in `min..=max`
    #[serde(rename_all = "camelCase")]
    Range {
        integer_width: IntegerWidth,
        min: u64,
        max: u64,
    },
}

impl SeedSpec {
    pub fn string(text: impl Into<String>) -> Self {
        Self::literal(SeedEncoding::String, SeedValue::Text(text.into()))
    }

    pub fn address(text: impl Into<String>) -> Self {
        Self::literal(SeedEncoding::Address, SeedValue::Text(text.into()))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::literal(SeedEncoding::Bytes, SeedValue::Bytes(bytes.into()))
    }

    pub fn integer(value: u64) -> Self {
        Self::literal(SeedEncoding::Integer, SeedValue::Integer(value))
    }

    pub fn auto(text: impl Into<String>) -> Self {
        Self::literal(SeedEncoding::Auto, SeedValue::Text(text.into()))
    }

    pub fn literal(encoding: SeedEncoding, value: SeedValue) -> Self {
        SeedSpec::Literal {
            encoding,
            value: Some(value),
        }
    }

    pub fn range(integer_width: IntegerWidth, min: u64, max: u64) -> Self {
        SeedSpec::Range {
            integer_width,
            min,
            max,
        }
    }

    /// Number of values this seed takes; 0 for a malformed range
    pub fn cardinality(&self) -> u128 {
        match self {
            SeedSpec::Literal { .. } => 1,
            SeedSpec::Range { min, max, .. } => {
                max.checked_sub(*min).map_or(0, |span| span as u128 + 1)
            }
        }
    }

    /// Check range bounds without encoding anything
    pub fn validate(&self) -> Result<(), SeedError> {
        match self {
            SeedSpec::Literal { value: None, .. } => Err(SeedError::MissingValue),
            SeedSpec::Literal { .. } => Ok(()),
            SeedSpec::Range {
                integer_width,
                min,
                max,
            } => {
                if min > max {
                    return Err(SeedError::MinExceedsMax {
                        min: *min,
                        max: *max,
                    });
                }
                let cardinality = self.cardinality();
                if cardinality > MAX_RANGE_CARDINALITY as u128 {
                    return Err(SeedError::RangeTooLarge {
                        cardinality,
                        max: MAX_RANGE_CARDINALITY,
                    });
                }
                if *max > integer_width.max_value() {
                    return Err(SeedError::ValueExceedsWidth {
                        max: *max,
                        width: integer_width.bytes(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Product of every spec's cardinality, saturating at `u128::MAX`
pub fn total_combinations(specs: &[SeedSpec]) -> u128 {
    specs
        .iter()
        .fold(1u128, |acc, spec| acc.saturating_mul(spec.cardinality()))
}

/// Product of every spec's cardinality, `None` past `u128::MAX`
///
/// Eight maximal ranges already give 1e40 combinations.
pub fn checked_total_combinations(specs: &[SeedSpec]) -> Option<u128> {
    specs
        .iter()
        .try_fold(1u128, |acc, spec| acc.checked_mul(spec.cardinality()))
}

/// Product of every spec's cardinality as a float; never saturates
pub fn approx_total_combinations(specs: &[SeedSpec]) -> f64 {
    specs.iter().map(|spec| spec.cardinality() as f64).product()
}
