//! PdaVanity Seed Handling
//!
//! Seed specifications, the byte codec for seed values, and a lazy cursor
//! over every seed combination a search explores.

mod codec;
mod cursor;
mod spec;
mod tuple;

pub use codec::{encode_integer, encode_integer_with_width, encode_literal, encode_text};
pub use cursor::{SeedCursor, SeedDimension};
pub use spec::{
    approx_total_combinations, checked_total_combinations, total_combinations, IntegerWidth, SeedEncoding, SeedError, SeedSpec, SeedValue,
    MAX_RANGE_CARDINALITY,
};
pub use tuple::SeedTuple;
