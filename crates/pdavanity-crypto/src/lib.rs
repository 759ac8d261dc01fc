//! PdaVanity Crypto Primitives
//!
//! Hashing, Base58 addresses, the Ed25519 curve-point test and
//! program-derived address construction.

pub mod ed25519;
pub mod hash;
pub mod encoding;
pub mod pda;

pub use self::encoding::{Address, EncodingError};
pub use self::pda::{
    create_program_address, derive_program_address, DerivedAddress, PdaError,
    MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER,
};
