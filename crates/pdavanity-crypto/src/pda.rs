//! Program-derived address construction
//!
//! `address = sha256(seed_1 || .. || seed_n || [bump] || program_id || PDA_MARKER)`,
//! searching `bump` from 255 downwards for the first digest that is off the
//! Ed25519 curve.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::ed25519::is_on_curve;
use crate::hash::sha256v;
use crate::encoding::Address;

/// Maximum length of a single seed in bytes
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, including the bump seed
pub const MAX_SEEDS: usize = 16;

/// Domain separator appended to every derivation hash
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdaError {
    #[error("Seed {index} is {len} bytes (max {max})")]
    SeedTooLong { index: usize, len: usize, max: usize },
    #[error("Too many seeds: {count} (max {max})")]
    TooManySeeds { count: usize, max: usize },
    #[error("No bump in 0..=255 produced an off-curve address")]
    NoValidBumpFound,
    #[error("Seeds hash to a point on the curve")]
    InvalidSeeds,
}

/// A derived address together with the bump that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub address: Address,
    pub bump: u8,
}

fn check_seeds<S: AsRef<[u8]>>(seeds: &[S], max_count: usize) -> Result<(), PdaError> {
    if seeds.len() > max_count {
        return Err(PdaError::TooManySeeds {
            count: seeds.len(),
            max: max_count,
        });
    }
    for (index, seed) in seeds.iter().enumerate() {
        let len = seed.as_ref().len();
        if len > MAX_SEED_LEN {
            return Err(PdaError::SeedTooLong {
                index,
                len,
                max: MAX_SEED_LEN,
            });
        }
    }
    Ok(())
}

fn finish(mut hasher: Sha256, program_id: &Address) -> [u8; 32] {
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

/// Hash `seeds` (bump already included by the caller) into an address,
/// rejecting digests that land on the curve
pub fn create_program_address<S: AsRef<[u8]>>(
    seeds: &[S],
    program_id: &Address,
) -> Result<Address, PdaError> {
    check_seeds(seeds, MAX_SEEDS)?;

    let mut parts: Vec<&[u8]> = seeds.iter().map(|seed| seed.as_ref()).collect();
    parts.push(program_id.as_bytes());
    parts.push(PDA_MARKER);
    let digest = sha256v(&parts);

    if is_on_curve(&digest) {
        return Err(PdaError::InvalidSeeds);
    }
    Ok(Address::new(digest))
}

/// Find the canonical (highest-bump) program-derived address for `seeds`
///
/// Pure and allocation-free; safe to call from any number of threads.
pub fn derive_program_address<S: AsRef<[u8]>>(
    seeds: &[S],
    program_id: &Address,
) -> Result<DerivedAddress, PdaError> {
    // One slot is reserved for the bump
    check_seeds(seeds, MAX_SEEDS - 1)?;

    // The seed prefix is identical for every bump, hash it once
    let mut prefix = Sha256::new();
    for seed in seeds {
        prefix.update(seed.as_ref());
    }

    for bump in (0..=u8::MAX).rev() {
        let mut hasher = prefix.clone();
        hasher.update([bump]);
        let digest = finish(hasher, program_id);
        if !is_on_curve(&digest) {
            return Ok(DerivedAddress {
                address: Address::new(digest),
                bump,
            });
        }
    }

    Err(PdaError::NoValidBumpFound)
}
