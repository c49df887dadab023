// Primitive selection
// Closed set of primitives, parsed from their command names

use std::fmt;
use std::str::FromStr;

use crate::block::{BlockCipherKind, Mode, SymmetricKey};
use crate::config::{RsaConfig, SignatureConfig};
use crate::dh::{generate_key_pair, DhParameters};
use crate::error::{Error, Result, ValidationError};
use crate::key_material::KeyMaterial;
use crate::math::prime::local_rng;
use crate::math::PrimeSearch;
use crate::rsa::generate_keypair_with;
use crate::signature::generate_keys_with;

/// Grouping used when listing primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveCategory {
    BlockCipher,
    PublicKey,
    KeyExchange,
    Signature,
}

impl fmt::Display for PrimitiveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveCategory::BlockCipher => "block cipher",
            PrimitiveCategory::PublicKey => "public-key cryptosystem",
            PrimitiveCategory::KeyExchange => "key exchange",
            PrimitiveCategory::Signature => "signature",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Aes,
    Des,
    Rsa,
    DiffieHellman,
    RsaSignature,
}

impl Primitive {
    pub const ALL: [Primitive; 5] = [
        Primitive::Aes,
        Primitive::Des,
        Primitive::Rsa,
        Primitive::DiffieHellman,
        Primitive::RsaSignature,
    ];

    /// Command name, as accepted by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Aes => "aes",
            Primitive::Des => "des",
            Primitive::Rsa => "rsa",
            Primitive::DiffieHellman => "dh",
            Primitive::RsaSignature => "rsasig",
        }
    }

    pub fn category(self) -> PrimitiveCategory {
        match self {
            Primitive::Aes | Primitive::Des => PrimitiveCategory::BlockCipher,
            Primitive::Rsa => PrimitiveCategory::PublicKey,
            Primitive::DiffieHellman => PrimitiveCategory::KeyExchange,
            Primitive::RsaSignature => PrimitiveCategory::Signature,
        }
    }

    pub fn block_cipher(self) -> Option<BlockCipherKind> {
        match self {
            Primitive::Aes => Some(BlockCipherKind::Aes),
            Primitive::Des => Some(BlockCipherKind::Des),
            _ => None,
        }
    }

    /// Key size used when the caller gives none
    pub fn default_key_bits(self) -> u32 {
        match self {
            Primitive::Aes => 128,
            Primitive::Des => 64,
            Primitive::Rsa | Primitive::DiffieHellman => 2048,
            Primitive::RsaSignature => 1024,
        }
    }

    /// Fresh key material for this primitive, for callers that were given
    /// none. `mode` only matters to block ciphers (CBC adds an IV).
    ///
    /// Diffie-Hellman without `bits` uses the RFC 3526 2048-bit group;
    /// with `bits` it generates a new group of that size.
    pub fn generate_key_material(self, bits: Option<u32>, mode: Mode) -> Result<KeyMaterial> {
        let key_bits = bits.unwrap_or_else(|| self.default_key_bits());
        match self {
            Primitive::Aes | Primitive::Des => {
                let kind = self
                    .block_cipher()
                    .ok_or_else(|| Error::invalid_parameter("not a block cipher"))?;
                let key = SymmetricKey::generate(kind, key_bits as usize, mode)?;
                Ok(key.to_key_material(kind))
            }
            Primitive::Rsa => {
                let config = RsaConfig::default().with_bit_length(key_bits);
                let keypair =
                    generate_keypair_with(&config, &mut local_rng(), &PrimeSearch::default())?;
                Ok(keypair.to_key_material())
            }
            Primitive::DiffieHellman => {
                let params = match bits {
                    Some(bits) => DhParameters::generate(bits)?,
                    None => DhParameters::modp_2048(),
                };
                let pair = generate_key_pair(&params)?;
                let mut material = params.to_key_material();
                material.extend(pair.to_key_material());
                Ok(material)
            }
            Primitive::RsaSignature => {
                let config = SignatureConfig::default().with_bit_length(key_bits);
                Ok(generate_keys_with(&config)?.to_key_material())
            }
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Primitive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Primitive::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or(ValidationError::UnsupportedPrimitive(name).into())
    }
}
