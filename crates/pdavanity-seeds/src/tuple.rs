//! Concrete seed combinations

use std::fmt;

use serde::{Deserialize, Serialize};

/// One byte vector per seed position, in spec order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedTuple(Vec<Vec<u8>>);

impl SeedTuple {
    pub fn new(seeds: Vec<Vec<u8>>) -> Self {
        Self(seeds)
    }

    pub fn seeds(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Vec<u8>> {
        self.0
    }

    /// Hex rendering of each seed
    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(hex::encode).collect()
    }
}

impl From<Vec<Vec<u8>>> for SeedTuple {
    fn from(seeds: Vec<Vec<u8>>) -> Self {
        Self(seeds)
    }
}

impl fmt::Display for SeedTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_hex().join(", "))
    }
}
