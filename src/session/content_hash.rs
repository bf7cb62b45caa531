//! Content hashing for recompute-skip keys.
//!
//! A content hash concatenates three cheap, independent, non-cryptographic checksums of the
//! text (Adler-32, CRC-32 and a 64-bit Fx hash), each rendered in base 36. It only keys memoized
//! recomputation and is never used for identity or security.

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Hash `text` into its recompute-skip key.
pub fn content_hash(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut fx = FxHasher::default();
    fx.write(bytes);

    let mut out = String::with_capacity(32);
    push_base36(&mut out, u64::from(adler2::adler32_slice(bytes)));
    push_base36(&mut out, u64::from(crc32fast::hash(bytes)));
    push_base36(&mut out, fx.finish());
    out
}

fn push_base36(out: &mut String, mut value: u64) {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut buf = [0u8; 13];
    let mut at = buf.len();
    loop {
        at -= 1;
        buf[at] = DIGITS[(value % 36) as usize];
        value /= 36;
        if value == 0 {
            break;
        }
    }
    out.extend(buf[at..].iter().map(|&b| char::from(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36() {
        let render = |value| {
            let mut out = String::new();
            push_base36(&mut out, value);
            out
        };
        assert_eq!(render(0), "0");
        assert_eq!(render(35), "z");
        assert_eq!(render(36), "10");
        assert_eq!(render(u64::MAX), "3w5e11264sgsf");
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        assert_eq!(content_hash("x\n"), content_hash("x\n"));
        assert_ne!(content_hash("x\n"), content_hash("y\n"));
        assert_ne!(content_hash("x\n"), content_hash("x \n"));
    }

    #[test]
    fn test_empty_text_hash() {
        // adler32("") == 1, crc32("") == 0
        assert!(content_hash("").starts_with("10"));
    }
}
