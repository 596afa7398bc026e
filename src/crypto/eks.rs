//! The expensive key schedule and the digest it produces.

use std::iter;

use log::debug;
use zeroize::Zeroizing;

use super::blowfish::stream_to_word;
use super::{CTEXT_WORDS, CipherState, DIGEST_LEN, MAGIC_CTEXT, MAX_KEY_LEN};
use crate::format::{BcryptParams, Version};

/// Turns a password into the key bytes fed to the schedule.
///
/// `$2a$` stops at the first NUL byte, appends a terminator and keeps the
/// length in 8 bits, so lengths wrap at 256. A wrapped length of zero keys
/// the first byte alone. `$2b$` appends a terminator to the raw bytes and
/// keeps at most 72 bytes.
///
/// Only the first 72 bytes of a key ever reach the subkeys, so longer keys
/// are cut there.
pub fn password_key(password: &[u8], version: Version) -> Zeroizing<Vec<u8>> {
    let (bytes, len) = match version {
        Version::A => {
            let end = password
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(password.len());
            let keyed = (end + 1) % 256;
            (&password[..end], keyed.max(1))
        }
        Version::B => (password, password.len() + 1),
    };
    let len = len.min(MAX_KEY_LEN);

    let mut key = Zeroizing::new(Vec::with_capacity(len));
    key.extend(bytes.iter().copied().chain(iter::once(0)).take(len));
    key
}

/// Runs EksBlowfish over `params` and `password` and writes the 23-byte
/// digest to `digest`.
///
/// The cipher state and every intermediate buffer are zeroed before return.
pub fn bcrypt_digest(params: &BcryptParams, password: &[u8], digest: &mut [u8; DIGEST_LEN]) {
    let key = password_key(password, params.version());
    let salt = params.salt();
    let cost = params.cost();

    debug!("bcrypt key schedule: cost {cost}, {} rounds", cost.rounds());

    let mut state = CipherState::initstate();
    state.expandstate(salt, &key);
    for _ in 0..cost.rounds() {
        state.expand0state(&key);
        state.expand0state(salt);
    }

    let mut cdata = Zeroizing::new([0u32; CTEXT_WORDS]);
    let mut pos = 0;
    for word in cdata.iter_mut() {
        *word = stream_to_word(MAGIC_CTEXT, &mut pos);
    }
    for _ in 0..64 {
        state.encipher_words(cdata.as_mut_slice());
    }

    let mut ctext = Zeroizing::new([0u8; CTEXT_WORDS * 4]);
    for (bytes, word) in ctext.chunks_exact_mut(4).zip(cdata.iter()) {
        bytes.copy_from_slice(&word.to_be_bytes());
    }
    digest.copy_from_slice(&ctext[..DIGEST_LEN]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::base64;

    fn digest_for(salt: &str, password: &[u8]) -> String {
        let params = BcryptParams::parse(salt).unwrap();
        let mut digest = [0u8; DIGEST_LEN];
        bcrypt_digest(&params, password, &mut digest);
        base64::encode(&digest)
    }

    #[test]
    fn b_key_appends_terminator() {
        assert_eq!(password_key(b"abc", Version::B).as_slice(), b"abc\0");
        assert_eq!(password_key(b"", Version::B).as_slice(), b"\0");
    }

    #[test]
    fn b_key_keeps_embedded_nul() {
        assert_eq!(password_key(b"ab\0cd", Version::B).as_slice(), b"ab\0cd\0");
    }

    #[test]
    fn b_key_is_capped_at_72_bytes() {
        let key = password_key(&[b'x'; 71], Version::B);
        assert_eq!(key.len(), 72);
        assert_eq!(key[71], 0);

        let key = password_key(&[b'x'; 72], Version::B);
        assert_eq!(key.as_slice(), &[b'x'; 72]);

        let key = password_key(&[b'x'; 200], Version::B);
        assert_eq!(key.as_slice(), &[b'x'; 72]);
    }

    #[test]
    fn a_key_stops_at_nul() {
        assert_eq!(password_key(b"ab\0cd", Version::A).as_slice(), b"ab\0");
        assert_eq!(password_key(b"\0abc", Version::A).as_slice(), b"\0");
    }

    #[test]
    fn a_key_length_wraps_at_256() {
        let key = password_key(&[b'p'; 255], Version::A);
        assert_eq!(key.as_slice(), b"p");

        let key = password_key(&[b'p'; 256], Version::A);
        assert_eq!(key.as_slice(), b"p");

        let key = password_key(&[b'p'; 260], Version::A);
        assert_eq!(key.as_slice(), b"ppppp");
    }

    #[test]
    fn digest_matches_reference() {
        assert_eq!(
            digest_for("$2b$04$If6bvum7DFjUnE9p2uDeDu", b"abc"),
            "cp2Wtj9yCnnZ/22ojXzNt6nEEkieowK"
        );
        assert_eq!(
            digest_for("$2a$06$DCq7YPn5Rq63x1Lad4cll.", b""),
            "TV4S6ytwfsfvkgY8jIucDrjc8deX1s."
        );
    }

    #[test]
    fn digest_depends_on_cost() {
        assert_ne!(
            digest_for("$2b$04$If6bvum7DFjUnE9p2uDeDu", b"abc"),
            digest_for("$2b$05$If6bvum7DFjUnE9p2uDeDu", b"abc")
        );
    }
}
