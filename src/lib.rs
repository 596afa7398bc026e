//! bcrypt password hashing.
//!
//! A bit-exact implementation of the OpenBSD bcrypt construction: Blowfish,
//! the EksBlowfish key schedule, bcrypt base64, and the
//! `$2<v>$<cost>$<salt><digest>` text format. Hashes interoperate with every
//! other bcrypt implementation for the `$2a$` and `$2b$` tags.
//!
//! ```no_run
//! let salt = bcrypt_core::generate_salt(12, bcrypt_core::Version::B)?;
//! let hashed = bcrypt_core::hash("hunter2", &salt)?;
//! assert!(bcrypt_core::verify("hunter2", &hashed));
//! # Ok::<(), bcrypt_core::BcryptError>(())
//! ```

mod crypto;
mod error;
mod format;
mod salt;

pub use crate::crypto::{DIGEST_LEN, SALT_LEN};
pub use crate::error::{BcryptError, Result};
pub use crate::format::base64;
pub use crate::format::{
    BcryptParams, Cost, DEFAULT_COST, HASH_LEN, MAX_COST, MIN_COST, SALT_STRING_LEN, Version,
};
pub use crate::salt::{gen_salt, generate_salt};

use log::trace;
use zeroize::Zeroizing;

/// Hashes `password` with the parameters encoded in `salt`.
///
/// `salt` is a salt string such as the output of [`gen_salt`], or a complete
/// stored hash, whose digest is then ignored.
///
/// # Errors
///
/// Returns [`BcryptError::InvalidSaltFormat`] or
/// [`BcryptError::InvalidAlphabetCharacter`] if `salt` cannot be parsed.
/// No cipher work is done in that case.
pub fn hash<P: AsRef<[u8]>>(password: P, salt: &str) -> Result<String> {
    let params = BcryptParams::parse(salt)?;
    Ok(hash_with_params(password.as_ref(), &params))
}

/// Hashes `password` under a fresh `$2b$` salt of the given cost.
///
/// # Errors
///
/// Returns [`BcryptError::RandomUnavailable`] if no salt could be drawn.
pub fn hash_with_cost<P: AsRef<[u8]>>(password: P, cost: u32) -> Result<String> {
    let salt = generate_salt(cost, Version::B)?;
    hash(password, &salt)
}

/// Checks `password` against a stored hash.
///
/// Returns `false` for a wrong password and for a malformed `stored` alike.
pub fn verify<P: AsRef<[u8]>>(password: P, stored: &str) -> bool {
    match check(password.as_ref(), stored) {
        Ok(()) => true,
        Err(e) => {
            trace!("bcrypt verification failed: {e}");
            false
        }
    }
}

fn hash_with_params(password: &[u8], params: &BcryptParams) -> String {
    let mut digest = Zeroizing::new([0u8; DIGEST_LEN]);
    crypto::bcrypt_digest(params, password, &mut digest);
    params.encode_hash(&digest)
}

fn check(password: &[u8], stored: &str) -> Result<()> {
    let params = BcryptParams::parse(stored)?;
    let computed = Zeroizing::new(hash_with_params(password, &params));

    if computed.len() != stored.len() {
        return Err(BcryptError::LengthMismatch);
    }
    if !crypto::constant_time_eq(computed.as_bytes(), stored.as_bytes()) {
        return Err(BcryptError::VerificationMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_2B_04: &str = "$2b$04$If6bvum7DFjUnE9p2uDeDucp2Wtj9yCnnZ/22ojXzNt6nEEkieowK";

    #[test]
    fn known_answer_abc_cost_4() {
        let hashed = hash("abc", "$2b$04$If6bvum7DFjUnE9p2uDeDu").unwrap();
        assert_eq!(hashed, ABC_2B_04);
        assert_eq!(hashed.len(), HASH_LEN);
    }

    #[test]
    fn published_vectors() {
        let vectors = [
            (
                "",
                "$2a$06$DCq7YPn5Rq63x1Lad4cll.",
                "$2a$06$DCq7YPn5Rq63x1Lad4cll.TV4S6ytwfsfvkgY8jIucDrjc8deX1s.",
            ),
            (
                "abc",
                "$2a$06$If6bvum7DFjUnE9p2uDeDu",
                "$2a$06$If6bvum7DFjUnE9p2uDeDu0YHzrHM6tf.iqN8.yx.jNN1ILEf7h0i",
            ),
            (
                "Kk4DQuMMfZL9o",
                "$2b$04$cVWp4XaNU8a4v1uMRum2SO",
                "$2b$04$cVWp4XaNU8a4v1uMRum2SO026BWLIoQMD/TXg5uZV.0P.uO8m3YEm",
            ),
            (
                "correct horse",
                "$2b$04$..CA.uOD/eaGAOmJB.yMBu",
                "$2b$04$..CA.uOD/eaGAOmJB.yMBuM872uvtNqimzkCcRocGwv7haFzmUZ5a",
            ),
        ];

        for (password, salt, expected) in vectors {
            assert_eq!(hash(password, salt).unwrap(), expected, "{password:?}");
        }
    }

    #[test]
    fn hashing_with_a_stored_hash_as_salt_reproduces_it() {
        assert_eq!(hash("abc", ABC_2B_04).unwrap(), ABC_2B_04);
    }

    #[test]
    fn hash_is_deterministic() {
        let salt = gen_salt(&[9u8; SALT_LEN], 4, Version::B);
        assert_eq!(hash("pw", &salt).unwrap(), hash("pw", &salt).unwrap());
    }

    #[test]
    fn cost_changes_the_hash() {
        let random = [3u8; SALT_LEN];
        let h4 = hash("pw", &gen_salt(&random, 4, Version::B)).unwrap();
        let h5 = hash("pw", &gen_salt(&random, 5, Version::B)).unwrap();
        assert_ne!(h4[SALT_STRING_LEN..], h5[SALT_STRING_LEN..]);
    }

    #[test]
    fn verify_roundtrip() {
        let salt = generate_salt(4, Version::B).unwrap();
        let hashed = hash("correct horse", &salt).unwrap();
        assert!(verify("correct horse", &hashed));
        assert!(!verify("correct horsf", &hashed));
        assert!(!verify("", &hashed));
    }

    #[test]
    fn verify_known_answer() {
        assert!(verify("abc", ABC_2B_04));
        assert!(verify(
            b"",
            "$2a$06$DCq7YPn5Rq63x1Lad4cll.TV4S6ytwfsfvkgY8jIucDrjc8deX1s."
        ));
        assert!(!verify("abd", ABC_2B_04));
    }

    #[test]
    fn hash_with_cost_uses_b_and_verifies() {
        let hashed = hash_with_cost("pw", 4).unwrap();
        assert!(hashed.starts_with("$2b$04$"));
        assert!(verify("pw", &hashed));
    }

    #[test]
    fn malformed_salts_fail_before_hashing() {
        for salt in [
            "2b$04$If6bvum7DFjUnE9p2uDeDu",
            "$2x$04$If6bvum7DFjUnE9p2uDeDu",
            "$2b$0a$If6bvum7DFjUnE9p2uDeDu",
            "$2b$03$If6bvum7DFjUnE9p2uDeDu",
            "$2b$04$If6bvum7DFjUnE9p2",
        ] {
            assert_eq!(hash("abc", salt), Err(BcryptError::InvalidSaltFormat), "{salt}");
        }
        assert_eq!(
            hash("abc", "$2b$04$If6bvum7DFjUnE9p2uD!Du"),
            Err(BcryptError::InvalidAlphabetCharacter)
        );
    }

    #[test]
    fn check_reports_failure_kinds() {
        assert_eq!(check(b"abc", "nope"), Err(BcryptError::InvalidSaltFormat));
        assert_eq!(
            check(b"abc", &format!("{ABC_2B_04}x")),
            Err(BcryptError::LengthMismatch)
        );
        assert_eq!(
            check(b"abc", &ABC_2B_04[..SALT_STRING_LEN]),
            Err(BcryptError::LengthMismatch)
        );
        assert_eq!(
            check(b"abd", ABC_2B_04),
            Err(BcryptError::VerificationMismatch)
        );
        assert_eq!(check(b"abc", ABC_2B_04), Ok(()));
    }

    #[test]
    fn malformed_stored_hash_just_fails() {
        assert!(!verify("abc", ""));
        assert!(!verify("abc", "$2b$03$If6bvum7DFjUnE9p2uDeDucp2Wtj9yCnnZ/22ojXzNt6nEEkieowK"));
        assert!(!verify("abc", &ABC_2B_04[..40]));
    }

    #[test]
    fn non_canonical_salt_symbol_is_rewritten() {
        let hashed = hash("abc", "$2b$04$If6bvum7DFjUnE9p2uDeDv").unwrap();
        assert_eq!(hashed, ABC_2B_04);

        let mut tampered = ABC_2B_04.to_string();
        tampered.replace_range(28..29, "v");
        assert!(!verify("abc", &tampered));
    }

    #[test]
    fn a_truncates_at_nul_and_b_does_not() {
        let a = "$2a$04$If6bvum7DFjUnE9p2uDeDu";
        let b = "$2b$04$If6bvum7DFjUnE9p2uDeDu";

        assert_eq!(hash(b"ab\0cd", a).unwrap(), hash(b"ab", a).unwrap());
        assert_eq!(
            hash(b"ab\0cd", a).unwrap(),
            "$2a$04$If6bvum7DFjUnE9p2uDeDuwVHiuI/ke0Y1P0yjREuEnNmzgWFzF7S"
        );
        assert_eq!(
            hash(b"ab\0cd", b).unwrap(),
            "$2b$04$If6bvum7DFjUnE9p2uDeDuDv/W6lReq7BD9.aDJc9rSxUeA11VUTO"
        );
        assert!(!verify(b"ab", &hash(b"ab\0cd", b).unwrap()));
    }

    #[test]
    fn b_ignores_bytes_past_72() {
        let salt = "$2b$04$If6bvum7DFjUnE9p2uDeDu";
        let h72 = hash([b'p'; 72], salt).unwrap();
        assert_eq!(h72, "$2b$04$If6bvum7DFjUnE9p2uDeDuzccbb.9ARn0PEvLj6ffdXUVZWIqc.Nq");
        assert_eq!(hash([b'p'; 100], salt).unwrap(), h72);
        assert_eq!(
            hash([b'p'; 71], salt).unwrap(),
            "$2b$04$If6bvum7DFjUnE9p2uDeDuUxisFDTOpP4V7l/qqf1rkZ6g3YH7CIe"
        );
    }

    #[test]
    fn a_with_256_byte_password_keys_one_byte() {
        let hashed = hash([b'p'; 256], "$2a$04$If6bvum7DFjUnE9p2uDeDu").unwrap();
        assert_eq!(
            hashed,
            "$2a$04$If6bvum7DFjUnE9p2uDeDuzccbb.9ARn0PEvLj6ffdXUVZWIqc.Nq"
        );
    }

    #[test]
    fn minor_version_only_changes_the_tag_for_plain_passwords() {
        let a = hash("abc", "$2a$04$If6bvum7DFjUnE9p2uDeDu").unwrap();
        assert_eq!(&a[..4], "$2a$");
        assert_eq!(a[4..], ABC_2B_04[4..]);
    }
}
