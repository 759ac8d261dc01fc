//! Odometer-style cursor over the seed space
//!
//! Holds one index per seed position and advances the last position fastest,
//! exactly like nested loops with the last seed innermost. Nothing is
//! generated ahead of what the caller pulls.

use crate::codec::{encode_integer_with_width, encode_literal};
use crate::spec::{IntegerWidth, SeedError, SeedSpec};
use crate::tuple::SeedTuple;

/// One encoded seed position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedDimension {
    /// Pre-encoded literal bytes
    Fixed(Vec<u8>),
    /// Integers `min..=max` in a fixed width
    Range {
        min: u64,
        max: u64,
        width: IntegerWidth,
    },
}

impl SeedDimension {
    /// Validate and encode one seed spec
    pub fn from_spec(spec: &SeedSpec) -> Result<Self, SeedError> {
        spec.validate()?;
        match spec {
            SeedSpec::Literal {
                encoding,
                value: Some(value),
            } => Ok(SeedDimension::Fixed(encode_literal(*encoding, value)?)),
            SeedSpec::Literal { value: None, .. } => Err(SeedError::MissingValue),
            SeedSpec::Range {
                integer_width,
                min,
                max,
            } => Ok(SeedDimension::Range {
                min: *min,
                max: *max,
                width: *integer_width,
            }),
        }
    }

    pub fn cardinality(&self) -> u128 {
        match self {
            SeedDimension::Fixed(_) => 1,
            SeedDimension::Range { min, max, .. } => {
                max.checked_sub(*min).map_or(0, |span| span as u128 + 1)
            }
        }
    }

    /// Longest byte vector this position can produce
    pub fn max_len(&self) -> usize {
        match self {
            SeedDimension::Fixed(bytes) => bytes.len(),
            SeedDimension::Range { width, .. } => width.bytes(),
        }
    }

    fn value_at(&self, index: u64) -> Vec<u8> {
        match self {
            SeedDimension::Fixed(bytes) => bytes.clone(),
            SeedDimension::Range { min, width, .. } => {
                encode_integer_with_width(min + index, *width)
            }
        }
    }
}

/// Lazy, restartable cursor over every seed combination
#[derive(Debug, Clone)]
pub struct SeedCursor {
    dims: Vec<SeedDimension>,
    indices: Vec<u64>,
    position: u128,
    start: u128,
    end: u128,
    total: u128,
}

impl SeedCursor {
    /// Cursor over the full product of `dims`
    pub fn new(dims: Vec<SeedDimension>) -> Self {
        let total = dims
            .iter()
            .fold(1u128, |acc, dim| acc.saturating_mul(dim.cardinality()));
        let indices = vec![0; dims.len()];
        Self {
            dims,
            indices,
            position: 0,
            start: 0,
            end: total,
            total,
        }
    }

    /// Cursor over ordinals `start..end` of the full order
    pub fn bounded(dims: Vec<SeedDimension>, start: u128, end: u128) -> Self {
        let mut cursor = Self::new(dims);
        cursor.end = end.min(cursor.total);
        cursor.start = start.min(cursor.end);
        cursor.seek(cursor.start);
        cursor
    }

    pub fn dimensions(&self) -> &[SeedDimension] {
        &self.dims
    }

    /// Size of the full seed space
    pub fn total(&self) -> u128 {
        self.total
    }

    /// Ordinal of the next combination to be produced
    pub fn position(&self) -> u128 {
        self.position
    }

    /// Combinations left before this cursor is exhausted
    pub fn remaining(&self) -> u128 {
        self.end - self.position
    }

    /// No more combinations, distinct from a short batch
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.end
    }

    /// Rewind to the first combination of this cursor's range
    pub fn reset(&mut self) {
        self.seek(self.start);
    }

    /// Jump to an absolute ordinal, clamped to this cursor's range
    pub fn seek(&mut self, position: u128) {
        self.position = position.clamp(self.start, self.end);
        let mut rest = self.position;
        for (index, dim) in self.indices.iter_mut().zip(&self.dims).rev() {
            let cardinality = dim.cardinality();
            if cardinality == 0 {
                *index = 0;
                continue;
            }
            *index = (rest % cardinality) as u64;
            rest /= cardinality;
        }
    }

    /// Pull up to `n` combinations; empty only when exhausted
    pub fn next_batch(&mut self, n: usize) -> Vec<SeedTuple> {
        let take = self.remaining().min(n as u128) as usize;
        let mut batch = Vec::with_capacity(take);
        batch.extend(self.by_ref().take(take));
        batch
    }

    fn current(&self) -> SeedTuple {
        let seeds = self
            .dims
            .iter()
            .zip(&self.indices)
            .map(|(dim, &index)| dim.value_at(index))
            .collect();
        SeedTuple::new(seeds)
    }

    fn advance(&mut self) {
        self.position += 1;
        for (index, dim) in self.indices.iter_mut().zip(&self.dims).rev() {
            *index += 1;
            if (*index as u128) < dim.cardinality() {
                return;
            }
            *index = 0;
        }
    }
}

impl Iterator for SeedCursor {
    type Item = SeedTuple;

    fn next(&mut self) -> Option<SeedTuple> {
        if self.is_exhausted() {
            return None;
        }
        let tuple = self.current();
        self.advance();
        Some(tuple)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, usize::try_from(self.remaining()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dims(specs: &[SeedSpec]) -> Vec<SeedDimension> {
        specs
            .iter()
            .map(|spec| SeedDimension::from_spec(spec).unwrap())
            .collect()
    }

    #[test]
    fn test_last_range_varies_fastest() {
        let mut cursor = SeedCursor::new(dims(&[
            SeedSpec::range(IntegerWidth::U8, 0, 1),
            SeedSpec::string("x"),
            SeedSpec::range(IntegerWidth::U8, 5, 7),
        ]));

        let got: Vec<(u8, u8)> = cursor
            .by_ref()
            .map(|t| (t.seeds()[0][0], t.seeds()[2][0]))
            .collect();

        let mut expected = Vec::new();
        for a in 0..=1u8 {
            for b in 5..=7u8 {
                expected.push((a, b));
            }
        }
        assert_eq!(got, expected);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_completeness_no_duplicates() {
        let cursor = SeedCursor::new(dims(&[
            SeedSpec::range(IntegerWidth::U16, 0, 9),
            SeedSpec::range(IntegerWidth::U8, 0, 4),
            SeedSpec::range(IntegerWidth::U32, 100, 102),
        ]));
        assert_eq!(cursor.total(), 150);

        let all: Vec<SeedTuple> = cursor.collect();
        assert_eq!(all.len(), 150);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 150);
    }

    #[test]
    fn test_literals_repeat_in_every_tuple() {
        let cursor = SeedCursor::new(dims(&[
            SeedSpec::string("vault"),
            SeedSpec::range(IntegerWidth::U64, 0, 2),
        ]));
        let all: Vec<SeedTuple> = cursor.collect();
        assert_eq!(all.len(), 3);
        for (i, tuple) in all.iter().enumerate() {
            assert_eq!(tuple.seeds()[0], b"vault".to_vec());
            assert_eq!(tuple.seeds()[1], (i as u64).to_le_bytes().to_vec());
        }
    }

    #[test]
    fn test_batches_and_exhaustion_signal() {
        let mut cursor = SeedCursor::new(dims(&[SeedSpec::range(IntegerWidth::U8, 0, 9)]));

        assert_eq!(cursor.next_batch(4).len(), 4);
        assert_eq!(cursor.next_batch(4).len(), 4);
        // Short batch, but not exhausted until fully consumed
        let last = cursor.next_batch(4);
        assert_eq!(last.len(), 2);
        assert!(cursor.is_exhausted());
        assert!(cursor.next_batch(4).is_empty());

        cursor.reset();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.next_batch(100).len(), 10);
    }

    #[test]
    fn test_seek_matches_sequential_order() {
        let specs = [
            SeedSpec::range(IntegerWidth::U8, 0, 6),
            SeedSpec::range(IntegerWidth::U8, 0, 4),
        ];
        let all: Vec<SeedTuple> = SeedCursor::new(dims(&specs)).collect();

        let mut cursor = SeedCursor::new(dims(&specs));
        cursor.seek(17);
        assert_eq!(cursor.next(), Some(all[17].clone()));
    }

    #[test]
    fn test_bounded_partitions_concatenate() {
        let specs = [
            SeedSpec::range(IntegerWidth::U8, 0, 9),
            SeedSpec::range(IntegerWidth::U8, 0, 9),
        ];
        let all: Vec<SeedTuple> = SeedCursor::new(dims(&specs)).collect();

        let mut joined = Vec::new();
        for (start, end) in [(0, 33), (33, 34), (34, 100), (100, 500)] {
            joined.extend(SeedCursor::bounded(dims(&specs), start, end));
        }
        assert_eq!(joined, all);
    }

    #[test]
    fn test_invalid_spec_rejected() {
        assert_eq!(
            SeedDimension::from_spec(&SeedSpec::range(IntegerWidth::U8, 3, 1)),
            Err(SeedError::MinExceedsMax { min: 3, max: 1 })
        );
    }
}
