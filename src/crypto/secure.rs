//! Timing-safe comparison.
//!
//! Erasure is handled by `zeroize`: [`CipherState`](super::CipherState) and
//! [`BcryptParams`](crate::BcryptParams) zero themselves on drop, and
//! transient buffers are held in [`zeroize::Zeroizing`].

use subtle::ConstantTimeEq;

/// Compares `a` and `b` without branching on their contents.
///
/// The length check is ordinary control flow. Encoded hash lengths are
/// public, so this leaks nothing a caller could not already see.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_buffers_match() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"$2b$04$abc", b"$2b$04$abc"));
    }

    #[test]
    fn single_byte_difference_is_found_anywhere() {
        let base = [0x41u8; 60];
        for i in 0..base.len() {
            for flip in [0x01u8, 0x80, 0xff] {
                let mut other = base;
                other[i] ^= flip;
                assert!(!constant_time_eq(&base, &other), "index {i}, flip {flip:#x}");
            }
        }
    }

    #[test]
    fn different_lengths_never_match() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"", b"a"));
    }
}
