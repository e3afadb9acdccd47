//! Binary detection: a NUL byte in the leading window marks a file binary.

const SNIFF_LEN: usize = 8192;

pub fn is_binary(content: &[u8]) -> bool {
    let window = &content[..content.len().min(SNIFF_LEN)];
    window.contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_not_binary() {
        assert!(!is_binary(b"def main():\n    pass\n"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn nul_byte_is_binary() {
        assert!(is_binary(&[0x89, b'P', b'N', b'G', 0x00, 0x01]));
    }
}
