//! Cryptographic core of bcrypt.
//!
//! Provides the Blowfish cipher, the expensive key schedule, and the
//! constant-time helpers used when checking a password.

pub mod blowfish;
pub mod consts;
pub mod eks;
pub mod secure;

pub use blowfish::CipherState;
pub use eks::bcrypt_digest;
pub use secure::constant_time_eq;

/// Length of the raw salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the raw digest kept from the cipher output (23 bytes).
pub const DIGEST_LEN: usize = 23;
/// Number of 32-bit words in the whitened ciphertext.
pub const CTEXT_WORDS: usize = 6;
/// Maximum number of key bytes the subkey array can absorb (72 bytes).
pub const MAX_KEY_LEN: usize = 72;
/// Fixed plaintext enciphered 64 times to produce the digest.
pub const MAGIC_CTEXT: &[u8; CTEXT_WORDS * 4] = b"OrpheanBeholderScryDoubt";
