//! Content hashing via xxh3.

use xxhash_rust::xxh3::xxh3_64;

/// Compute the xxh3 64-bit hash of file content.
#[inline]
pub fn hash_content(content: &[u8]) -> u64 {
    xxh3_64(content)
}

/// Hash rendered as 16 lowercase hex digits, the form stored in the store.
pub fn content_hash_hex(content: &[u8]) -> String {
    format!("{:016x}", hash_content(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_hash() {
        let data = b"hello world";
        assert_eq!(hash_content(data), hash_content(data));
    }

    #[test]
    fn different_content_different_hash() {
        assert_ne!(hash_content(b"hello"), hash_content(b"world"));
    }

    #[test]
    fn hex_is_fixed_width() {
        assert_eq!(content_hash_hex(b"").len(), 16);
        assert_eq!(content_hash_hex(b"abc").len(), 16);
    }
}
