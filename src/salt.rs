//! Salt string generation.

use getrandom::fill;
use zeroize::Zeroizing;

use crate::crypto::SALT_LEN;
use crate::error::{BcryptError, Result};
use crate::format::{BcryptParams, Cost, Version};

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| BcryptError::RandomUnavailable)
}

/// Builds a salt string from 16 caller-supplied random bytes.
///
/// Unlike parsing, `cost` is clamped into `4..=31` rather than rejected.
pub fn gen_salt(random: &[u8; SALT_LEN], cost: u32, version: Version) -> String {
    BcryptParams::new(version, Cost::clamped(cost), *random).salt_string()
}

/// Builds a salt string from OS randomness.
///
/// # Errors
///
/// Returns [`BcryptError::RandomUnavailable`] if the OS generator fails.
pub fn generate_salt(cost: u32, version: Version) -> Result<String> {
    let mut random = Zeroizing::new([0u8; SALT_LEN]);
    secure_random(random.as_mut_slice())?;
    Ok(gen_salt(&random, cost, version))
}
