//! Blowfish primitives used by the bcrypt key schedule.
//!
//! Only encryption is provided. Keys and salts are consumed as a cyclic
//! stream of big-endian 32-bit words.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::consts::{P_INIT, S_INIT};

const ROUNDS: usize = 16;

/// Key-dependent cipher state: four S-boxes and the subkey array.
///
/// Deliberately not `Clone`: one hash owns exactly one state, and it is
/// zeroed when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherState {
    s: [[u32; 256]; 4],
    p: [u32; ROUNDS + 2],
}

/// Reads the next big-endian word from `data`, wrapping to the start when
/// the end is reached.
///
/// `data` must not be empty.
pub fn stream_to_word(data: &[u8], pos: &mut usize) -> u32 {
    let mut word = 0u32;
    for _ in 0..4 {
        if *pos >= data.len() {
            *pos = 0;
        }
        word = (word << 8) | u32::from(data[*pos]);
        *pos += 1;
    }
    word
}

impl CipherState {
    /// Loads the fixed initial constants.
    pub fn initstate() -> Self {
        Self {
            s: S_INIT,
            p: P_INIT,
        }
    }

    /// Standard Blowfish key expansion.
    pub fn expand0state(&mut self, key: &[u8]) {
        self.expand(key, None);
    }

    /// Salted key expansion: each block is XORed with the next two salt words
    /// before it is enciphered.
    pub fn expandstate(&mut self, salt: &[u8], key: &[u8]) {
        self.expand(key, Some(salt));
    }

    /// Enciphers one 64-bit block given as its two big-endian halves.
    pub fn encipher(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        l ^= self.p[0];
        for i in (1..=ROUNDS).step_by(2) {
            r ^= self.f(l) ^ self.p[i];
            l ^= self.f(r) ^ self.p[i + 1];
        }
        (r ^ self.p[ROUNDS + 1], l)
    }

    /// Enciphers consecutive word pairs of `data` in place (ECB).
    pub fn encipher_words(&self, data: &mut [u32]) {
        for block in data.chunks_exact_mut(2) {
            let (l, r) = self.encipher(block[0], block[1]);
            block[0] = l;
            block[1] = r;
        }
    }

    fn f(&self, x: u32) -> u32 {
        let [a, b, c, d] = x.to_be_bytes();
        let h = self.s[0][usize::from(a)].wrapping_add(self.s[1][usize::from(b)]);
        (h ^ self.s[2][usize::from(c)]).wrapping_add(self.s[3][usize::from(d)])
    }

    fn expand(&mut self, key: &[u8], salt: Option<&[u8]>) {
        let mut pos = 0;
        for p in self.p.iter_mut() {
            *p ^= stream_to_word(key, &mut pos);
        }

        let mut pos = 0;
        let mut block = (0u32, 0u32);
        for i in (0..ROUNDS + 2).step_by(2) {
            block = self.next_block(block, salt, &mut pos);
            (self.p[i], self.p[i + 1]) = block;
        }
        for sbox in 0..4 {
            for i in (0..256).step_by(2) {
                block = self.next_block(block, salt, &mut pos);
                (self.s[sbox][i], self.s[sbox][i + 1]) = block;
            }
        }
    }

    fn next_block(
        &self,
        (mut l, mut r): (u32, u32),
        salt: Option<&[u8]>,
        pos: &mut usize,
    ) -> (u32, u32) {
        if let Some(salt) = salt {
            l ^= stream_to_word(salt, pos);
            r ^= stream_to_word(salt, pos);
        }
        self.encipher(l, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(key: &[u8]) -> CipherState {
        let mut state = CipherState::initstate();
        state.expand0state(key);
        state
    }

    #[test]
    fn initial_constants_are_pi_digits() {
        let state = CipherState::initstate();
        assert_eq!(state.p[0], 0x243f6a88);
        assert_eq!(state.p[17], 0x8979fb1b);
        assert_eq!(state.s[0][0], 0xd1310ba6);
        assert_eq!(state.s[3][255], 0x3ac372e6);
    }

    #[test]
    fn encipher_matches_published_ecb_vectors() {
        let vectors: [([u8; 8], (u32, u32), (u32, u32)); 4] = [
            ([0x00; 8], (0x00000000, 0x00000000), (0x4ef99745, 0x6198dd78)),
            ([0xff; 8], (0xffffffff, 0xffffffff), (0x51866fd5, 0xb85ecb8a)),
            (
                [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef],
                (0x11111111, 0x11111111),
                (0x61f9c380, 0x2281b096),
            ),
            (
                [0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32, 0x10],
                (0x01234567, 0x89abcdef),
                (0x0aceab0f, 0xc6a0a28d),
            ),
        ];

        for (key, plain, cipher) in vectors {
            let state = keyed(&key);
            assert_eq!(state.encipher(plain.0, plain.1), cipher);
        }
    }

    #[test]
    fn encipher_words_chains_blocks_independently() {
        let state = keyed(&[0u8; 8]);
        let mut words = [0u32; 4];
        state.encipher_words(&mut words);
        assert_eq!(words, [0x4ef99745, 0x6198dd78, 0x4ef99745, 0x6198dd78]);
    }

    #[test]
    fn stream_to_word_wraps_short_input() {
        let mut pos = 0;
        assert_eq!(stream_to_word(b"abc", &mut pos), u32::from_be_bytes(*b"abca"));
        assert_eq!(stream_to_word(b"abc", &mut pos), u32::from_be_bytes(*b"bcab"));
        assert_eq!(pos, 2);
    }

    #[test]
    fn stream_to_word_repeats_single_byte() {
        let mut pos = 0;
        assert_eq!(stream_to_word(b"p", &mut pos), u32::from_be_bytes(*b"pppp"));
    }

    #[test]
    fn salted_expansion_differs_from_plain() {
        let plain = keyed(b"password");
        let mut salted = CipherState::initstate();
        salted.expandstate(&[0x5a; 16], b"password");
        assert_ne!(plain.p, salted.p);
        assert_ne!(plain.s[3], salted.s[3]);
    }

    #[test]
    fn zero_salt_expansion_equals_plain_expansion() {
        let plain = keyed(b"password");
        let mut salted = CipherState::initstate();
        salted.expandstate(&[0u8; 16], b"password");
        assert_eq!(plain.p, salted.p);
        assert_eq!(plain.s, salted.s);
    }

    #[test]
    fn zeroize_clears_tables() {
        let mut state = keyed(b"secret");
        state.zeroize();
        assert!(state.p.iter().all(|&w| w == 0));
        assert!(state.s.iter().flatten().all(|&w| w == 0));
    }
}
