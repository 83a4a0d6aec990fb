//! Hashing helpers and donation reference codes.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Prefix carried by every donation reference code.
pub const REFERENCE_CODE_PREFIX: &str = "RW-";

/// Characters used for reference codes. Excludes 0/O and 1/I/L.
const REFERENCE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

const REFERENCE_CODE_LEN: usize = 6;

/// Computes SHA-256 of a string and returns it as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    sha256_hex_bytes(input.as_bytes())
}

/// Computes SHA-256 of raw bytes and returns it as lowercase hex.
///
/// Used to derive content-addressed names for uploaded donation media.
pub fn sha256_hex_bytes(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Generates a human-readable donation reference code such as `RW-7Q2K9D`.
pub fn generate_reference_code() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..REFERENCE_CODE_LEN)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", REFERENCE_CODE_PREFIX, body)
}

/// Returns true if `code` has the shape produced by [`generate_reference_code`].
pub fn is_reference_code(code: &str) -> bool {
    match code.strip_prefix(REFERENCE_CODE_PREFIX) {
        Some(body) => {
            body.len() == REFERENCE_CODE_LEN
                && body.bytes().all(|b| REFERENCE_ALPHABET.contains(&b))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_bytes_matches_str_variant() {
        assert_eq!(sha256_hex_bytes(b"jacket.png"), sha256_hex("jacket.png"));
    }

    #[test]
    fn test_sha256_hex_bytes_empty() {
        assert_eq!(
            sha256_hex_bytes(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_reference_code_shape() {
        for _ in 0..50 {
            let code = generate_reference_code();
            assert!(code.starts_with("RW-"));
            assert_eq!(code.len(), 9);
            assert!(is_reference_code(&code), "unexpected code {}", code);
        }
    }

    #[test]
    fn test_reference_code_avoids_ambiguous_characters() {
        for _ in 0..50 {
            let code = generate_reference_code();
            assert!(!code[3..].contains(['0', 'O', '1', 'I', 'L']));
        }
    }

    #[test]
    fn test_is_reference_code_rejects_other_shapes() {
        assert!(!is_reference_code("RW-ABC"));
        assert!(!is_reference_code("XX-ABCDEF"));
        assert!(!is_reference_code("RW-abcdef"));
        assert!(!is_reference_code(""));
    }
}
