// DES Block Cipher
// 16-round Feistel network with the standard permutation/rotation key schedule

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, ValidationError};

/// DES block size in bytes
pub const BLOCK_SIZE: usize = 8;

/// Key size in bits; every eighth bit is parity and is ignored
pub const KEY_BITS: usize = 64;

// Tables use the FIPS 46-3 convention: bit 1 is the most significant.

const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10, 2, 60, 52, 44, 36, 28, 20, 12, 4, //
    62, 54, 46, 38, 30, 22, 14, 6, 64, 56, 48, 40, 32, 24, 16, 8, //
    57, 49, 41, 33, 25, 17, 9, 1, 59, 51, 43, 35, 27, 19, 11, 3, //
    61, 53, 45, 37, 29, 21, 13, 5, 63, 55, 47, 39, 31, 23, 15, 7,
];

const FP: [u8; 64] = invert_permutation(&IP);

const E: [u8; 48] = [
    32, 1, 2, 3, 4, 5, 4, 5, 6, 7, 8, 9, //
    8, 9, 10, 11, 12, 13, 12, 13, 14, 15, 16, 17, //
    16, 17, 18, 19, 20, 21, 20, 21, 22, 23, 24, 25, //
    24, 25, 26, 27, 28, 29, 28, 29, 30, 31, 32, 1,
];

const P: [u8; 32] = [
    16, 7, 20, 21, 29, 12, 28, 17, 1, 15, 23, 26, 5, 18, 31, 10, //
    2, 8, 24, 14, 32, 27, 3, 9, 19, 13, 30, 6, 22, 11, 4, 25,
];

const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17, 9, 1, 58, 50, 42, 34, 26, 18, //
    10, 2, 59, 51, 43, 35, 27, 19, 11, 3, 60, 52, 44, 36, //
    63, 55, 47, 39, 31, 23, 15, 7, 62, 54, 46, 38, 30, 22, //
    14, 6, 61, 53, 45, 37, 29, 21, 13, 5, 28, 20, 12, 4,
];

const PC2: [u8; 48] = [
    14, 17, 11, 24, 1, 5, 3, 28, 15, 6, 21, 10, //
    23, 19, 12, 4, 26, 8, 16, 7, 27, 20, 13, 2, //
    41, 52, 31, 37, 47, 55, 30, 40, 51, 45, 33, 48, //
    44, 49, 39, 56, 34, 53, 46, 42, 50, 36, 29, 32,
];

const SHIFTS: [u32; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

// Each S-box is four rows of sixteen entries.
const SBOXES: [[u8; 64]; 8] = [
    [
        14, 4, 13, 1, 2, 15, 11, 8, 3, 10, 6, 12, 5, 9, 0, 7, //
        0, 15, 7, 4, 14, 2, 13, 1, 10, 6, 12, 11, 9, 5, 3, 8, //
        4, 1, 14, 8, 13, 6, 2, 11, 15, 12, 9, 7, 3, 10, 5, 0, //
        15, 12, 8, 2, 4, 9, 1, 7, 5, 11, 3, 14, 10, 0, 6, 13,
    ],
    [
        15, 1, 8, 14, 6, 11, 3, 4, 9, 7, 2, 13, 12, 0, 5, 10, //
        3, 13, 4, 7, 15, 2, 8, 14, 12, 0, 1, 10, 6, 9, 11, 5, //
        0, 14, 7, 11, 10, 4, 13, 1, 5, 8, 12, 6, 9, 3, 2, 15, //
        13, 8, 10, 1, 3, 15, 4, 2, 11, 6, 7, 12, 0, 5, 14, 9,
    ],
    [
        10, 0, 9, 14, 6, 3, 15, 5, 1, 13, 12, 7, 11, 4, 2, 8, //
        13, 7, 0, 9, 3, 4, 6, 10, 2, 8, 5, 14, 12, 11, 15, 1, //
        13, 6, 4, 9, 8, 15, 3, 0, 11, 1, 2, 12, 5, 10, 14, 7, //
        1, 10, 13, 0, 6, 9, 8, 7, 4, 15, 14, 3, 11, 5, 2, 12,
    ],
    [
        7, 13, 14, 3, 0, 6, 9, 10, 1, 2, 8, 5, 11, 12, 4, 15, //
        13, 8, 11, 5, 6, 15, 0, 3, 4, 7, 2, 12, 1, 10, 14, 9, //
        10, 6, 9, 0, 12, 11, 7, 13, 15, 1, 3, 14, 5, 2, 8, 4, //
        3, 15, 0, 6, 10, 1, 13, 8, 9, 4, 5, 11, 12, 7, 2, 14,
    ],
    [
        2, 12, 4, 1, 7, 10, 11, 6, 8, 5, 3, 15, 13, 0, 14, 9, //
        14, 11, 2, 12, 4, 7, 13, 1, 5, 0, 15, 10, 3, 9, 8, 6, //
        4, 2, 1, 11, 10, 13, 7, 8, 15, 9, 12, 5, 6, 3, 0, 14, //
        11, 8, 12, 7, 1, 14, 2, 13, 6, 15, 0, 9, 10, 4, 5, 3,
    ],
    [
        12, 1, 10, 15, 9, 2, 6, 8, 0, 13, 3, 4, 14, 7, 5, 11, //
        10, 15, 4, 2, 7, 12, 9, 5, 6, 1, 13, 14, 0, 11, 3, 8, //
        9, 14, 15, 5, 2, 8, 12, 3, 7, 0, 4, 10, 1, 13, 11, 6, //
        4, 3, 2, 12, 9, 5, 15, 10, 11, 14, 1, 7, 6, 0, 8, 13,
    ],
    [
        4, 11, 2, 14, 15, 0, 8, 13, 3, 12, 9, 7, 5, 10, 6, 1, //
        13, 0, 11, 7, 4, 9, 1, 10, 14, 3, 5, 12, 2, 15, 8, 6, //
        1, 4, 11, 13, 12, 3, 7, 14, 10, 15, 6, 8, 0, 5, 9, 2, //
        6, 11, 13, 8, 1, 4, 10, 7, 9, 5, 0, 15, 14, 2, 3, 12,
    ],
    [
        13, 2, 8, 4, 6, 15, 11, 1, 10, 9, 3, 14, 5, 0, 12, 7, //
        1, 15, 13, 8, 10, 3, 7, 4, 12, 5, 6, 11, 0, 14, 9, 2, //
        7, 11, 4, 1, 9, 12, 14, 2, 0, 6, 10, 13, 15, 3, 5, 8, //
        2, 1, 14, 7, 4, 10, 8, 13, 15, 12, 9, 0, 3, 5, 6, 11,
    ],
];

const fn invert_permutation(table: &[u8; 64]) -> [u8; 64] {
    let mut inverse = [0u8; 64];
    let mut i = 0;
    while i < 64 {
        inverse[table[i] as usize - 1] = (i + 1) as u8;
        i += 1;
    }
    inverse
}

/// Select bits of `input` (an `width`-bit value) in the order given by `table`.
fn permute(input: u64, table: &[u8], width: u32) -> u64 {
    table
        .iter()
        .fold(0u64, |out, &pos| (out << 1) | ((input >> (width - u32::from(pos))) & 1))
}

fn rotate_28(half: u64, shift: u32) -> u64 {
    ((half << shift) | (half >> (28 - shift))) & 0x0FFF_FFFF
}

/// DES with its 16 round keys; wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Des {
    subkeys: [u64; 16],
}

impl Des {
    /// Schedule an 8-byte key. Parity bits are dropped by PC-1.
    pub fn new(key: &[u8]) -> Result<Self> {
        let key: [u8; 8] = key.try_into().map_err(|_| ValidationError::InvalidKeyLength {
            cipher: "DES",
            bits: key.len() * 8,
        })?;

        let mut key_bits = u64::from_be_bytes(key);
        let permuted = permute(key_bits, &PC1, 64);
        key_bits.zeroize();

        let mut c = permuted >> 28;
        let mut d = permuted & 0x0FFF_FFFF;
        let mut subkeys = [0u64; 16];
        for (subkey, &shift) in subkeys.iter_mut().zip(SHIFTS.iter()) {
            c = rotate_28(c, shift);
            d = rotate_28(d, shift);
            *subkey = permute((c << 28) | d, &PC2, 56);
        }
        c.zeroize();
        d.zeroize();

        Ok(Self { subkeys })
    }

    pub fn round_key_count(&self) -> usize {
        self.subkeys.len()
    }

    /// Encrypt one block in place. `block` must be exactly 8 bytes.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        self.crypt(block, false);
    }

    /// Decrypt one block in place. `block` must be exactly 8 bytes.
    pub fn decrypt_block(&self, block: &mut [u8]) {
        self.crypt(block, true);
    }

    fn crypt(&self, block: &mut [u8], decrypt: bool) {
        let mut input = [0u8; BLOCK_SIZE];
        input.copy_from_slice(block);
        let permuted = permute(u64::from_be_bytes(input), &IP, 64);

        let mut left = permuted >> 32;
        let mut right = permuted & 0xFFFF_FFFF;
        for round in 0..16 {
            let subkey = if decrypt {
                self.subkeys[15 - round]
            } else {
                self.subkeys[round]
            };
            let next = left ^ feistel(right, subkey);
            left = right;
            right = next;
        }

        // Halves are swapped before the final permutation
        let output = permute((right << 32) | left, &FP, 64);
        block.copy_from_slice(&output.to_be_bytes());
    }
}

/// Round function: expand, mix with the subkey, substitute, permute.
fn feistel(half: u64, subkey: u64) -> u64 {
    let mixed = permute(half, &E, 32) ^ subkey;
    let mut substituted = 0u64;
    for (i, sbox) in SBOXES.iter().enumerate() {
        let six = (mixed >> (42 - 6 * i)) & 0x3F;
        let row = ((six & 0x20) >> 4) | (six & 1);
        let column = (six >> 1) & 0x0F;
        substituted = (substituted << 4) | u64::from(sbox[(row * 16 + column) as usize]);
    }
    permute(substituted, &P, 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(key: &str, plaintext: &str) -> Vec<u8> {
        let des = Des::new(&hex::decode(key).unwrap()).unwrap();
        let mut block = hex::decode(plaintext).unwrap();
        des.encrypt_block(&mut block);
        block
    }

    #[test]
    fn test_sbox_rows_are_permutations() {
        for sbox in SBOXES.iter() {
            for row in sbox.chunks_exact(16) {
                let mut sorted = row.to_vec();
                sorted.sort_unstable();
                assert_eq!(sorted, (0..16).collect::<Vec<u8>>());
            }
        }
    }

    #[test]
    fn test_final_permutation_inverts_initial() {
        let value = 0x0123_4567_89AB_CDEF;
        assert_eq!(permute(permute(value, &IP, 64), &FP, 64), value);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            run("133457799BBCDFF1", "0123456789ABCDEF"),
            hex::decode("85E813540F0AB405").unwrap()
        );
        assert_eq!(
            run("0123456789ABCDEF", "4E6F772069732074"),
            hex::decode("3FA40E8A984D4815").unwrap()
        );
    }

    #[test]
    fn test_decrypt_inverts_encrypt() {
        let des = Des::new(&hex::decode("133457799BBCDFF1").unwrap()).unwrap();
        let mut block = hex::decode("85E813540F0AB405").unwrap();
        des.decrypt_block(&mut block);
        assert_eq!(block, hex::decode("0123456789ABCDEF").unwrap());
    }

    #[test]
    fn test_parity_bits_ignored() {
        // Flipping the low (parity) bit of every key byte leaves the schedule unchanged
        let key = hex::decode("133457799BBCDFF1").unwrap();
        let flipped: Vec<u8> = key.iter().map(|b| b ^ 1).collect();
        assert_eq!(
            run("133457799BBCDFF1", "0123456789ABCDEF"),
            run(&hex::encode(flipped), "0123456789ABCDEF")
        );
    }

    #[test]
    fn test_invalid_key_length() {
        let err = Des::new(&[0u8; 7]).err().unwrap();
        assert_eq!(
            err,
            ValidationError::InvalidKeyLength {
                cipher: "DES",
                bits: 56
            }
            .into()
        );
        assert_eq!(Des::new(&[0u8; 8]).unwrap().round_key_count(), 16);
    }
}
