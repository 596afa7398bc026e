use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcryptError {
    /// The salt or stored hash does not follow `$2<v>$<cost>$<salt>`.
    InvalidSaltFormat,
    /// A symbol outside the bcrypt base64 alphabet was decoded.
    InvalidAlphabetCharacter,
    /// A cost factor outside `4..=31` was supplied to a typed constructor.
    InvalidCost(u32),
    /// The recomputed hash and the stored hash differ in length.
    LengthMismatch,
    /// The recomputed hash and the stored hash differ.
    VerificationMismatch,
    /// The operating system random generator could not be read.
    RandomUnavailable,
}

impl fmt::Display for BcryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcryptError::InvalidSaltFormat => write!(f, "invalid bcrypt salt format"),
            BcryptError::InvalidAlphabetCharacter => {
                write!(f, "invalid character in bcrypt base64 data")
            }
            BcryptError::InvalidCost(c) => write!(f, "cost {c} is outside the range 4..=31"),
            BcryptError::LengthMismatch => write!(f, "hash length mismatch"),
            BcryptError::VerificationMismatch => write!(f, "hash mismatch"),
            BcryptError::RandomUnavailable => write!(f, "OS random generator unavailable"),
        }
    }
}

impl std::error::Error for BcryptError {}

pub type Result<T> = std::result::Result<T, BcryptError>;
