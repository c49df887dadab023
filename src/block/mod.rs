// Block Cipher Module
// AES and DES transforms, padding, and ECB/CBC chaining

pub mod aes;
pub mod des;
pub mod engine;
pub mod key;
pub mod padding;
pub mod stream;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::key_material;

pub use aes::Aes;
pub use des::Des;
pub use engine::{decrypt, encrypt, BlockCipherEngine};
pub use key::SymmetricKey;
pub use stream::{Block, CipherStream};

/// A keyed block transform.
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block in place
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypt exactly one block in place
    fn decrypt_block(&self, block: &mut [u8]);
}

/// The supported block ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCipherKind {
    Aes,
    Des,
}

impl BlockCipherKind {
    pub fn block_size(self) -> usize {
        match self {
            BlockCipherKind::Aes => aes::BLOCK_SIZE,
            BlockCipherKind::Des => des::BLOCK_SIZE,
        }
    }

    /// Accepted key sizes in bits
    pub fn key_sizes(self) -> &'static [usize] {
        match self {
            BlockCipherKind::Aes => &aes::KEY_SIZES,
            BlockCipherKind::Des => &[des::KEY_BITS],
        }
    }

    pub fn supports_key_bits(self, bits: usize) -> bool {
        self.key_sizes().contains(&bits)
    }

    /// Key size used when the caller does not pick one
    pub fn default_key_bits(self) -> usize {
        match self {
            BlockCipherKind::Aes => 128,
            BlockCipherKind::Des => des::KEY_BITS,
        }
    }

    /// Run the key schedule for this cipher.
    pub fn schedule(self, key: &[u8]) -> Result<Cipher> {
        match self {
            BlockCipherKind::Aes => Aes::new(key).map(Cipher::Aes),
            BlockCipherKind::Des => Des::new(key).map(Cipher::Des),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockCipherKind::Aes => "aes",
            BlockCipherKind::Des => "des",
        }
    }

    pub(crate) fn key_field(self) -> &'static str {
        match self {
            BlockCipherKind::Aes => key_material::AES_KEY,
            BlockCipherKind::Des => key_material::DES_KEY,
        }
    }

    pub(crate) fn iv_field(self) -> &'static str {
        match self {
            BlockCipherKind::Aes => key_material::AES_IV,
            BlockCipherKind::Des => key_material::DES_IV,
        }
    }
}

impl fmt::Display for BlockCipherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Chaining mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Each block encrypted independently; equal plaintext blocks give equal
    /// ciphertext blocks.
    Ecb,
    /// Each plaintext block is XORed with the previous ciphertext block (the
    /// IV for the first) before encryption.
    Cbc,
}

impl Mode {
    pub fn requires_iv(self) -> bool {
        matches!(self, Mode::Cbc)
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Ecb => "ecb",
            Mode::Cbc => "cbc",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Mode::Ecb),
            "cbc" => Ok(Mode::Cbc),
            other => Err(Error::invalid_parameter(format!("unknown mode '{}'", other))),
        }
    }
}

/// A scheduled cipher, dispatched over the closed set of supported ciphers.
#[derive(Clone)]
pub enum Cipher {
    Aes(Aes),
    Des(Des),
}

impl Cipher {
    pub fn kind(&self) -> BlockCipherKind {
        match self {
            Cipher::Aes(_) => BlockCipherKind::Aes,
            Cipher::Des(_) => BlockCipherKind::Des,
        }
    }
}

impl BlockCipher for Cipher {
    fn block_size(&self) -> usize {
        self.kind().block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        match self {
            Cipher::Aes(aes) => aes.encrypt_block(block),
            Cipher::Des(des) => des.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        match self {
            Cipher::Aes(aes) => aes.decrypt_block(block),
            Cipher::Des(des) => des.decrypt_block(block),
        }
    }
}
