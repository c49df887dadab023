// AES Block Cipher
// FIPS-197 key expansion and round function for 128/192/256-bit keys

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, ValidationError};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Supported key sizes in bits
pub const KEY_SIZES: [usize; 3] = [128, 192, 256];

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

const fn xtime(x: u8) -> u8 {
    (x << 1) ^ if x & 0x80 != 0 { 0x1b } else { 0 }
}

/// Multiplication in GF(2^8) modulo x^8 + x^4 + x^3 + x + 1
const fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    product
}

/// S-box: multiplicative inverse in GF(2^8) followed by the affine map.
/// Inverses come from exp/log tables over the generator 3.
const fn build_sbox() -> [u8; 256] {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u8 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x;
        log[x as usize] = i as u8;
        x ^= xtime(x);
        i += 1;
    }

    let mut sbox = [0u8; 256];
    let mut a = 0;
    while a < 256 {
        let inv = if a == 0 {
            0
        } else {
            exp[(255 - log[a] as usize) % 255]
        };
        sbox[a] = inv
            ^ inv.rotate_left(1)
            ^ inv.rotate_left(2)
            ^ inv.rotate_left(3)
            ^ inv.rotate_left(4)
            ^ 0x63;
        a += 1;
    }
    sbox
}

const fn invert_sbox(sbox: &[u8; 256]) -> [u8; 256] {
    let mut inv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        inv[sbox[i] as usize] = i as u8;
        i += 1;
    }
    inv
}

const SBOX: [u8; 256] = build_sbox();
const INV_SBOX: [u8; 256] = invert_sbox(&SBOX);

/// AES with an expanded key schedule.
///
/// Holds `rounds + 1` round keys (11, 13 or 15); they are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes {
    round_keys: Vec<[u8; BLOCK_SIZE]>,
}

impl Aes {
    /// Expand a 16, 24 or 32 byte key.
    pub fn new(key: &[u8]) -> Result<Self> {
        if !KEY_SIZES.contains(&(key.len() * 8)) {
            return Err(ValidationError::InvalidKeyLength {
                cipher: "AES",
                bits: key.len() * 8,
            }
            .into());
        }
        Ok(Self {
            round_keys: expand_key(key),
        })
    }

    /// Number of round keys in the schedule
    pub fn round_key_count(&self) -> usize {
        self.round_keys.len()
    }

    pub fn rounds(&self) -> usize {
        self.round_keys.len() - 1
    }

    /// Encrypt one block in place. `block` must be exactly 16 bytes.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        let mut state = [0u8; BLOCK_SIZE];
        state.copy_from_slice(block);
        let rounds = self.rounds();

        add_round_key(&mut state, &self.round_keys[0]);
        for round_key in &self.round_keys[1..rounds] {
            sub_bytes(&mut state, &SBOX);
            shift_rows(&mut state);
            mix_columns(&mut state);
            add_round_key(&mut state, round_key);
        }
        sub_bytes(&mut state, &SBOX);
        shift_rows(&mut state);
        add_round_key(&mut state, &self.round_keys[rounds]);

        block.copy_from_slice(&state);
        state.zeroize();
    }

    /// Decrypt one block in place. `block` must be exactly 16 bytes.
    pub fn decrypt_block(&self, block: &mut [u8]) {
        let mut state = [0u8; BLOCK_SIZE];
        state.copy_from_slice(block);
        let rounds = self.rounds();

        add_round_key(&mut state, &self.round_keys[rounds]);
        for round_key in self.round_keys[1..rounds].iter().rev() {
            inv_shift_rows(&mut state);
            sub_bytes(&mut state, &INV_SBOX);
            add_round_key(&mut state, round_key);
            inv_mix_columns(&mut state);
        }
        inv_shift_rows(&mut state);
        sub_bytes(&mut state, &INV_SBOX);
        add_round_key(&mut state, &self.round_keys[0]);

        block.copy_from_slice(&state);
        state.zeroize();
    }
}

fn expand_key(key: &[u8]) -> Vec<[u8; BLOCK_SIZE]> {
    let nk = key.len() / 4;
    let rounds = nk + 6;
    let total_words = 4 * (rounds + 1);

    let mut words: Vec<[u8; 4]> = key
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();

    for i in nk..total_words {
        let mut temp = words[i - 1];
        if i % nk == 0 {
            temp.rotate_left(1);
            for b in temp.iter_mut() {
                *b = SBOX[*b as usize];
            }
            temp[0] ^= RCON[i / nk - 1];
        } else if nk > 6 && i % nk == 4 {
            for b in temp.iter_mut() {
                *b = SBOX[*b as usize];
            }
        }
        let prev = words[i - nk];
        words.push([
            prev[0] ^ temp[0],
            prev[1] ^ temp[1],
            prev[2] ^ temp[2],
            prev[3] ^ temp[3],
        ]);
    }

    let round_keys = words
        .chunks_exact(4)
        .map(|group| {
            let mut round_key = [0u8; BLOCK_SIZE];
            for (column, word) in group.iter().enumerate() {
                round_key[4 * column..4 * column + 4].copy_from_slice(word);
            }
            round_key
        })
        .collect();

    words.zeroize();
    round_keys
}

// State layout is column-major: byte (row r, column c) lives at r + 4c.

fn add_round_key(state: &mut [u8; BLOCK_SIZE], round_key: &[u8; BLOCK_SIZE]) {
    for (s, k) in state.iter_mut().zip(round_key.iter()) {
        *s ^= k;
    }
}

fn sub_bytes(state: &mut [u8; BLOCK_SIZE], table: &[u8; 256]) {
    for b in state.iter_mut() {
        *b = table[*b as usize];
    }
}

fn shift_rows(state: &mut [u8; BLOCK_SIZE]) {
    let old = *state;
    for row in 1..4 {
        for column in 0..4 {
            state[row + 4 * column] = old[row + 4 * ((column + row) % 4)];
        }
    }
}

fn inv_shift_rows(state: &mut [u8; BLOCK_SIZE]) {
    let old = *state;
    for row in 1..4 {
        for column in 0..4 {
            state[row + 4 * ((column + row) % 4)] = old[row + 4 * column];
        }
    }
}

fn mix_columns(state: &mut [u8; BLOCK_SIZE]) {
    for column in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        column[0] = xtime(a0) ^ (xtime(a1) ^ a1) ^ a2 ^ a3;
        column[1] = a0 ^ xtime(a1) ^ (xtime(a2) ^ a2) ^ a3;
        column[2] = a0 ^ a1 ^ xtime(a2) ^ (xtime(a3) ^ a3);
        column[3] = (xtime(a0) ^ a0) ^ a1 ^ a2 ^ xtime(a3);
    }
}

fn inv_mix_columns(state: &mut [u8; BLOCK_SIZE]) {
    for column in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        column[0] = gf_mul(a0, 14) ^ gf_mul(a1, 11) ^ gf_mul(a2, 13) ^ gf_mul(a3, 9);
        column[1] = gf_mul(a0, 9) ^ gf_mul(a1, 14) ^ gf_mul(a2, 11) ^ gf_mul(a3, 13);
        column[2] = gf_mul(a0, 13) ^ gf_mul(a1, 9) ^ gf_mul(a2, 14) ^ gf_mul(a3, 11);
        column[3] = gf_mul(a0, 11) ^ gf_mul(a1, 13) ^ gf_mul(a2, 9) ^ gf_mul(a3, 14);
    }
}
