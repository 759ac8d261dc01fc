//! Ed25519 curve membership
//!
//! A program-derived address is only valid when its bytes do not decompress
//! to a point on the Ed25519 curve, so no private key can ever sign for it.

use curve25519_dalek::edwards::CompressedEdwardsY;

/// Whether 32 bytes are the compressed encoding of a point on the curve
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}
