//! Text format of bcrypt hashes.
//!
//! ```text
//! $2 | MINOR (1) | $ | COST (2) | $ | SALT (22) | DIGEST (31)
//! ```
//!
//! A salt string is the first 29 characters; a full hash is 60.

use std::fmt;
use std::str::FromStr;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{DIGEST_LEN, SALT_LEN};
use crate::error::{BcryptError, Result};

pub mod base64;

/// Smallest accepted cost factor.
pub const MIN_COST: u32 = 4;
/// Largest accepted cost factor.
pub const MAX_COST: u32 = 31;
/// Cost used when the caller does not pick one.
pub const DEFAULT_COST: u32 = 12;

/// Length of `$2b$12$`.
pub const PREFIX_LEN: usize = 7;
/// Length of the encoded salt field.
pub const ENCODED_SALT_LEN: usize = base64::encoded_len(SALT_LEN);
/// Length of the encoded digest field.
pub const ENCODED_DIGEST_LEN: usize = base64::encoded_len(DIGEST_LEN);
/// Length of a salt string.
pub const SALT_STRING_LEN: usize = PREFIX_LEN + ENCODED_SALT_LEN;
/// Length of a complete hash.
pub const HASH_LEN: usize = SALT_STRING_LEN + ENCODED_DIGEST_LEN;

/// Minor version tag of the hash format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Version {
    /// `$2a$`: the password ends at its first NUL byte.
    A,
    /// `$2b$`: the password is used verbatim, capped at 72 bytes.
    #[default]
    B,
}

impl Version {
    pub fn as_char(self) -> char {
        match self {
            Version::A => 'a',
            Version::B => 'b',
        }
    }
}

impl TryFrom<u8> for Version {
    type Error = BcryptError;

    fn try_from(c: u8) -> Result<Self> {
        match c {
            b'a' => Ok(Version::A),
            b'b' => Ok(Version::B),
            _ => Err(BcryptError::InvalidSaltFormat),
        }
    }
}

impl FromStr for Version {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self> {
        match s.as_bytes() {
            [c] | [b'2', c] => Version::try_from(*c),
            _ => Err(BcryptError::InvalidSaltFormat),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Base-2 logarithm of the number of key schedule rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost(u32);

impl Default for Cost {
    fn default() -> Self {
        Self(DEFAULT_COST)
    }
}

impl Cost {
    /// Validates `cost` against `4..=31`.
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(BcryptError::InvalidCost(cost));
        }
        Ok(Self(cost))
    }

    /// Forces `cost` into `4..=31`. Only meant for producing fresh salts.
    pub fn clamped(cost: u32) -> Self {
        Self(cost.clamp(MIN_COST, MAX_COST))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of key schedule rounds, `2^cost`.
    pub fn rounds(self) -> u32 {
        1 << self.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Parameters recovered from a salt string or a stored hash.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BcryptParams {
    #[zeroize(skip)]
    version: Version,
    #[zeroize(skip)]
    cost: Cost,
    salt: [u8; SALT_LEN],
}

impl BcryptParams {
    pub fn new(version: Version, cost: Cost, salt: [u8; SALT_LEN]) -> Self {
        Self {
            version,
            cost,
            salt,
        }
    }

    /// Parses the `$2<v>$<cost>$<salt>` prefix of `s`.
    ///
    /// Anything after the 22 salt symbols, such as the digest of a stored
    /// hash, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BcryptError::InvalidSaltFormat`] if:
    /// - the `$2` marker or a `$` separator is missing
    /// - the minor version is not `a` or `b`
    /// - the cost is not two digits in `04..=31`
    /// - fewer than 22 salt symbols follow
    ///
    /// Returns [`BcryptError::InvalidAlphabetCharacter`] if the salt field
    /// holds a symbol outside the bcrypt alphabet.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();

        if !bytes.starts_with(b"$2") {
            return Err(BcryptError::InvalidSaltFormat);
        }

        let version = bytes
            .get(2)
            .copied()
            .ok_or(BcryptError::InvalidSaltFormat)
            .and_then(Version::try_from)?;

        if bytes.get(3) != Some(&b'$') {
            return Err(BcryptError::InvalidSaltFormat);
        }

        let cost = match bytes.get(4..PREFIX_LEN) {
            Some(&[tens, units, b'$']) if tens.is_ascii_digit() && units.is_ascii_digit() => {
                u32::from(tens - b'0') * 10 + u32::from(units - b'0')
            }
            _ => return Err(BcryptError::InvalidSaltFormat),
        };
        let cost = Cost::new(cost).map_err(|_| BcryptError::InvalidSaltFormat)?;

        let encoded = &bytes[PREFIX_LEN..];
        if encoded.len() < ENCODED_SALT_LEN {
            return Err(BcryptError::InvalidSaltFormat);
        }

        let mut params = Self::new(version, cost, [0u8; SALT_LEN]);
        base64::decode_into(&encoded[..ENCODED_SALT_LEN], &mut params.salt)?;

        Ok(params)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// The 22-symbol salt field.
    pub fn encoded_salt(&self) -> String {
        base64::encode(&self.salt)
    }

    /// Renders the 29-character salt string.
    pub fn salt_string(&self) -> String {
        let mut out = String::with_capacity(HASH_LEN);
        out.push_str("$2");
        out.push(self.version.as_char());
        out.push('$');
        out.push_str(&self.cost.to_string());
        out.push('$');
        out.push_str(&self.encoded_salt());
        out
    }

    /// Renders the full 60-character hash for `digest`.
    pub fn encode_hash(&self, digest: &[u8; DIGEST_LEN]) -> String {
        let mut out = self.salt_string();
        base64::encode_into(&mut out, digest);
        out
    }
}

impl FromStr for BcryptParams {
    type Err = BcryptError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
