//! The bcrypt flavour of base64.
//!
//! Uses its own alphabet (`./A-Za-z0-9`, in that order) and never pads.

use zeroize::Zeroize;

use crate::error::{BcryptError, Result};

const ALPHABET: &[u8; 64] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const INVALID: u8 = 0xff;

const INDEX: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Number of symbols needed to encode `len` bytes.
pub const fn encoded_len(len: usize) -> usize {
    (len * 4).div_ceil(3)
}

fn symbol(index: u8) -> char {
    char::from(ALPHABET[usize::from(index & 0x3f)])
}

fn value(c: u8) -> Result<u8> {
    match INDEX.get(usize::from(c)) {
        Some(&v) if v != INVALID => Ok(v),
        _ => Err(BcryptError::InvalidAlphabetCharacter),
    }
}

/// Encodes `data`; a trailing group of 1 or 2 bytes yields 2 or 3 symbols.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(data.len()));
    encode_into(&mut out, data);
    out
}

/// Appends the encoding of `data` to `out` without an intermediate buffer.
pub fn encode_into(out: &mut String, data: &[u8]) {
    out.reserve(encoded_len(data.len()));

    for chunk in data.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);

        out.push(symbol(b0 >> 2));
        out.push(symbol(((b0 & 0x03) << 4) | (b1 >> 4)));
        if chunk.len() > 1 {
            out.push(symbol(((b1 & 0x0f) << 2) | (b2 >> 6)));
        }
        if chunk.len() > 2 {
            out.push(symbol(b2));
        }
    }
}

/// Decodes exactly `out.len()` bytes from the start of `input`, stopping
/// mid-group if needed. Extra input is ignored.
///
/// # Errors
///
/// Returns [`BcryptError::InvalidAlphabetCharacter`] if a consumed symbol is
/// outside the alphabet or the input runs out. `out` is zeroed in that case.
pub fn decode_into(input: &[u8], out: &mut [u8]) -> Result<()> {
    let result = decode_groups(input, out);
    if result.is_err() {
        out.zeroize();
    }
    result
}

/// Decodes `len` bytes from `input` into a new buffer.
pub fn decode(input: &str, len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; len];
    decode_into(input.as_bytes(), &mut out)?;
    Ok(out)
}

fn decode_groups(input: &[u8], out: &mut [u8]) -> Result<()> {
    let mut symbols = input.iter().map(|&c| value(c));
    let mut next = || {
        symbols
            .next()
            .unwrap_or(Err(BcryptError::InvalidAlphabetCharacter))
    };

    let len = out.len();
    let mut n = 0;
    while n < len {
        let c1 = next()?;
        let c2 = next()?;
        out[n] = (c1 << 2) | ((c2 & 0x30) >> 4);
        n += 1;
        if n == len {
            break;
        }

        let c3 = next()?;
        out[n] = ((c2 & 0x0f) << 4) | ((c3 & 0x3c) >> 2);
        n += 1;
        if n == len {
            break;
        }

        let c4 = next()?;
        out[n] = ((c3 & 0x03) << 6) | c4;
        n += 1;
    }

    Ok(())
}
