// Configuration
// Explicit settings passed to each component's constructor

use serde::{Deserialize, Serialize};

use crate::block::{BlockCipherKind, Mode};
use crate::math::DEFAULT_MR_ROUNDS;
use crate::rsa::OaepHash;

/// Public exponent used unless the caller picks another
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65537;

/// Configuration for symmetric encryption
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockCipherConfig {
    pub cipher: BlockCipherKind,
    pub mode: Mode,
    /// Spread ECB and CBC-decrypt blocks over worker threads. Needs the
    /// `parallel` feature; ignored without it.
    pub parallel: bool,
}

impl Default for BlockCipherConfig {
    fn default() -> Self {
        Self {
            cipher: BlockCipherKind::Aes,
            mode: Mode::Cbc,
            parallel: true,
        }
    }
}

impl BlockCipherConfig {
    pub fn new(cipher: BlockCipherKind, mode: Mode) -> Self {
        Self {
            cipher,
            mode,
            ..Self::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Configuration for RSA key generation and encryption
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsaConfig {
    /// Modulus size in bits
    pub bit_length: u32,
    pub public_exponent: u64,
    pub use_oaep: bool,
    /// Hash for the OAEP label digest and MGF1
    pub oaep_hash: OaepHash,
    pub oaep_label: Vec<u8>,
    /// Unusable prime draws tolerated; one more fails key generation
    pub max_retries: u32,
    /// Must be at least 1
    pub miller_rabin_rounds: u32,
}

impl Default for RsaConfig {
    fn default() -> Self {
        Self {
            bit_length: 2048,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            use_oaep: true,
            oaep_hash: OaepHash::default(),
            oaep_label: Vec::new(),
            max_retries: 100,
            miller_rabin_rounds: DEFAULT_MR_ROUNDS,
        }
    }
}

impl RsaConfig {
    pub fn with_bit_length(mut self, bit_length: u32) -> Self {
        self.bit_length = bit_length;
        self
    }

    pub fn with_public_exponent(mut self, public_exponent: u64) -> Self {
        self.public_exponent = public_exponent;
        self
    }

    pub fn with_oaep(mut self, use_oaep: bool) -> Self {
        self.use_oaep = use_oaep;
        self
    }

    pub fn with_oaep_hash(mut self, hash: OaepHash) -> Self {
        self.oaep_hash = hash;
        self
    }

    pub fn with_oaep_label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.oaep_label = label.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_miller_rabin_rounds(mut self, rounds: u32) -> Self {
        self.miller_rabin_rounds = rounds;
        self
    }
}

/// Configuration for the RSA signature scheme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub bit_length: u32,
    pub public_exponent: u64,
    pub max_retries: u32,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            bit_length: 1024,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            max_retries: 100,
        }
    }
}

impl SignatureConfig {
    pub fn with_bit_length(mut self, bit_length: u32) -> Self {
        self.bit_length = bit_length;
        self
    }

    pub fn with_public_exponent(mut self, public_exponent: u64) -> Self {
        self.public_exponent = public_exponent;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Key generation settings for the underlying RSA generator.
    pub fn rsa_config(&self) -> RsaConfig {
        RsaConfig::default()
            .with_bit_length(self.bit_length)
            .with_public_exponent(self.public_exponent)
            .with_max_retries(self.max_retries)
            .with_oaep(false)
    }
}
