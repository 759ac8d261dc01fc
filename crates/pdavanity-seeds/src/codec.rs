//! Seed value to byte conversion

use pdavanity_crypto::Address;
use tracing::debug;

use crate::spec::{IntegerWidth, SeedEncoding, SeedError, SeedValue};

/// Little-endian bytes of `value` in the smallest width that holds it
pub fn encode_integer(value: u64) -> Vec<u8> {
    encode_integer_with_width(value, IntegerWidth::smallest_for(value))
}

/// Little-endian bytes of `value` truncated to `width`
///
/// Callers guarantee `value` fits; range seeds are checked at validation.
pub fn encode_integer_with_width(value: u64, width: IntegerWidth) -> Vec<u8> {
    value.to_le_bytes()[..width.bytes()].to_vec()
}

/// Raw address bytes when `text` is Base58 for exactly 32 bytes, otherwise
/// its UTF-8 bytes
pub fn encode_text(text: &str) -> Vec<u8> {
    match Address::from_base58(text) {
        Ok(address) => {
            debug!(seed = text, "text seed decodes to a 32-byte address, using raw bytes");
            address.to_bytes().to_vec()
        }
        Err(_) => text.as_bytes().to_vec(),
    }
}

fn invalid(encoding: SeedEncoding, reason: impl Into<String>) -> SeedError {
    SeedError::InvalidLiteral {
        encoding,
        reason: reason.into(),
    }
}

/// Encode a literal seed value under an explicit encoding
pub fn encode_literal(encoding: SeedEncoding, value: &SeedValue) -> Result<Vec<u8>, SeedError> {
    match (encoding, value) {
        (SeedEncoding::String, SeedValue::Text(text)) => Ok(text.as_bytes().to_vec()),
        (SeedEncoding::String, SeedValue::Integer(n)) => Ok(n.to_string().into_bytes()),

        (SeedEncoding::Address, SeedValue::Text(text)) => Address::from_base58(text)
            .map(|address| address.to_bytes().to_vec())
            .map_err(|e| invalid(encoding, e.to_string())),
        (SeedEncoding::Address, SeedValue::Bytes(bytes)) => {
            if bytes.len() == Address::LEN {
                Ok(bytes.clone())
            } else {
                Err(invalid(
                    encoding,
                    format!("expected {} bytes, got {}", Address::LEN, bytes.len()),
                ))
            }
        }

        (SeedEncoding::Bytes, SeedValue::Bytes(bytes)) => Ok(bytes.clone()),
        (SeedEncoding::Bytes, SeedValue::Text(text)) => {
            hex::decode(text.trim_start_matches("0x")).map_err(|e| invalid(encoding, e.to_string()))
        }

        (SeedEncoding::Integer, SeedValue::Integer(n)) => Ok(encode_integer(*n)),
        (SeedEncoding::Integer, SeedValue::Text(text)) => text
            .trim()
            .parse::<u64>()
            .map(encode_integer)
            .map_err(|e| invalid(encoding, format!("'{}': {}", text, e))),

        (SeedEncoding::Auto, SeedValue::Text(text)) => Ok(encode_text(text)),
        (SeedEncoding::Auto, SeedValue::Integer(n)) => Ok(encode_integer(*n)),
        (SeedEncoding::Auto, SeedValue::Bytes(bytes)) => Ok(bytes.clone()),

        (_, other) => Err(invalid(encoding, format!("unsupported value {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_tiers() {
        assert_eq!(encode_integer(7), vec![7]);
        assert_eq!(encode_integer(255), vec![255]);
        assert_eq!(encode_integer(256), vec![0, 1]);
        assert_eq!(encode_integer(70_000), vec![0x70, 0x11, 0x01, 0x00]);
        assert_eq!(encode_integer(1 << 32), vec![0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_explicit_width() {
        assert_eq!(encode_integer_with_width(7, IntegerWidth::U64), vec![7, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode_integer_with_width(258, IntegerWidth::U16), vec![2, 1]);
    }

    #[test]
    fn test_text_falls_back_to_utf8() {
        assert_eq!(encode_text("test"), b"test".to_vec());
        assert_eq!(encode_text("vault-0"), b"vault-0".to_vec());
    }

    #[test]
    fn test_text_address_decodes() {
        let address = Address::new([9u8; 32]);
        assert_eq!(encode_text(&address.to_string()), vec![9u8; 32]);
    }

    #[test]
    fn test_explicit_string_keeps_address_text() {
        let text = Address::new([9u8; 32]).to_string();
        let bytes = encode_literal(SeedEncoding::String, &SeedValue::Text(text.clone())).unwrap();
        assert_eq!(bytes, text.into_bytes());
    }

    #[test]
    fn test_explicit_address_must_be_32_bytes() {
        let err = encode_literal(SeedEncoding::Address, &SeedValue::Text("test".into()));
        assert!(matches!(
            err,
            Err(SeedError::InvalidLiteral {
                encoding: SeedEncoding::Address,
                ..
            })
        ));
    }

    #[test]
    fn test_bytes_from_hex() {
        let bytes = encode_literal(SeedEncoding::Bytes, &SeedValue::Text("0xdeadbeef".into()));
        assert_eq!(bytes.unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(encode_literal(SeedEncoding::Bytes, &SeedValue::Text("xyz".into())).is_err());
    }

    #[test]
    fn test_integer_from_text() {
        let bytes = encode_literal(SeedEncoding::Integer, &SeedValue::Text("300".into()));
        assert_eq!(bytes.unwrap(), vec![44, 1]);
        assert!(encode_literal(SeedEncoding::Integer, &SeedValue::Text("-1".into())).is_err());
    }
}
