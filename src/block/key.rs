// Symmetric Key
// Key bytes plus an optional IV, validated against a cipher and mode

use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{BlockCipherKind, Mode};
use crate::error::{Error, Result, ValidationError};
use crate::key_material::KeyMaterial;
use crate::math::prime::local_rng;
use crate::math::BigUnsignedInteger;

/// Key and optional IV for one block cipher operation. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: Vec<u8>,
    iv: Option<Vec<u8>>,
}

impl SymmetricKey {
    pub fn new(key: impl Into<Vec<u8>>, iv: Option<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            iv,
        }
    }

    /// Build a key from integers. `key_bits` fixes the key width so keys with
    /// leading zero bytes (including all-zero keys) keep their length.
    pub fn from_integer(
        kind: BlockCipherKind,
        key: &BigUnsignedInteger,
        key_bits: usize,
        iv: Option<&BigUnsignedInteger>,
    ) -> Result<Self> {
        if !kind.supports_key_bits(key_bits) {
            return Err(ValidationError::InvalidKeyLength {
                cipher: kind_label(kind),
                bits: key_bits,
            }
            .into());
        }
        let key_bytes = key.to_bytes_be_padded(key_bits / 8).ok_or(
            ValidationError::InvalidKeyLength {
                cipher: kind_label(kind),
                bits: key.bits() as usize,
            },
        )?;

        let block_size = kind.block_size();
        let iv = match iv {
            Some(iv) => Some(iv.to_bytes_be_padded(block_size).ok_or(
                ValidationError::InvalidIvLength {
                    expected: block_size,
                    actual: iv.to_bytes_be().len(),
                },
            )?),
            None => None,
        };

        Ok(Self::new(key_bytes, iv))
    }

    /// Fresh random key, plus a random IV when `mode` needs one.
    pub fn generate(kind: BlockCipherKind, key_bits: usize, mode: Mode) -> Result<Self> {
        Self::generate_with(kind, key_bits, mode, &mut local_rng())
    }

    pub fn generate_with<R: RngCore + CryptoRng>(
        kind: BlockCipherKind,
        key_bits: usize,
        mode: Mode,
        rng: &mut R,
    ) -> Result<Self> {
        if !kind.supports_key_bits(key_bits) {
            return Err(ValidationError::InvalidKeyLength {
                cipher: kind_label(kind),
                bits: key_bits,
            }
            .into());
        }

        let mut key = vec![0u8; key_bits / 8];
        rng.fill_bytes(&mut key);
        let iv = if mode.requires_iv() {
            let mut iv = vec![0u8; kind.block_size()];
            rng.fill_bytes(&mut iv);
            Some(iv)
        } else {
            None
        };

        Ok(Self { key, iv })
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub fn key_bits(&self) -> usize {
        self.key.len() * 8
    }

    /// Check the IV against the mode: present (and block sized) iff CBC.
    pub(crate) fn iv_for(&self, mode: Mode, block_size: usize) -> Result<Option<&[u8]>> {
        match (mode, self.iv.as_deref()) {
            (Mode::Ecb, None) => Ok(None),
            (Mode::Ecb, Some(_)) => Err(ValidationError::UnexpectedIv.into()),
            (Mode::Cbc, None) => Err(ValidationError::MissingIv.into()),
            (Mode::Cbc, Some(iv)) if iv.len() != block_size => {
                Err(ValidationError::InvalidIvLength {
                    expected: block_size,
                    actual: iv.len(),
                }
                .into())
            }
            (Mode::Cbc, Some(iv)) => Ok(Some(iv)),
        }
    }

    /// Mapping form: `AES_KEY`/`AES_IV` or `DES_KEY`/`DES_IV`.
    pub fn to_key_material(&self, kind: BlockCipherKind) -> KeyMaterial {
        let mut material =
            KeyMaterial::new().with(kind.key_field(), BigUnsignedInteger::from_bytes_be(&self.key));
        if let Some(iv) = &self.iv {
            material.insert(kind.iv_field(), BigUnsignedInteger::from_bytes_be(iv));
        }
        material
    }

    /// Parse the mapping form. The key field must be present; a zero value is
    /// a valid (all-zero) key. The IV field is optional.
    pub fn from_key_material(
        material: &KeyMaterial,
        kind: BlockCipherKind,
        key_bits: usize,
    ) -> Result<Self> {
        let key = material
            .get(kind.key_field())
            .ok_or_else(|| Error::missing_key(kind.key_field()))?;
        Self::from_integer(kind, key, key_bits, material.get(kind.iv_field()))
    }
}

fn kind_label(kind: BlockCipherKind) -> &'static str {
    match kind {
        BlockCipherKind::Aes => "AES",
        BlockCipherKind::Des => "DES",
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key_bits", &self.key_bits())
            .field("has_iv", &self.iv.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_material::{AES_IV, AES_KEY};

    #[test]
    fn test_from_integer_keeps_width() {
        let key = SymmetricKey::from_integer(
            BlockCipherKind::Aes,
            &BigUnsignedInteger::zero(),
            128,
            Some(&BigUnsignedInteger::zero()),
        )
        .unwrap();
        assert_eq!(key.key(), &[0u8; 16]);
        assert_eq!(key.iv().unwrap(), &[0u8; 16]);
    }

    #[test]
    fn test_from_integer_rejects_wide_values() {
        let wide = BigUnsignedInteger::one() + BigUnsignedInteger::from_u64(u64::MAX);
        let err = SymmetricKey::from_integer(BlockCipherKind::Des, &wide, 64, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidKeyLength { cipher: "DES", .. })
        ));

        let err = SymmetricKey::from_integer(BlockCipherKind::Aes, &wide, 100, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidKeyLength { bits: 100, .. })
        ));
    }

    #[test]
    fn test_generate() {
        let key = SymmetricKey::generate(BlockCipherKind::Aes, 256, Mode::Cbc).unwrap();
        assert_eq!(key.key_bits(), 256);
        assert_eq!(key.iv().unwrap().len(), 16);

        let key = SymmetricKey::generate(BlockCipherKind::Des, 64, Mode::Ecb).unwrap();
        assert_eq!(key.key_bits(), 64);
        assert!(key.iv().is_none());

        assert!(SymmetricKey::generate(BlockCipherKind::Des, 56, Mode::Ecb).is_err());
    }

    #[test]
    fn test_iv_rules() {
        let with_iv = SymmetricKey::new(vec![0u8; 16], Some(vec![0u8; 16]));
        let without_iv = SymmetricKey::new(vec![0u8; 16], None);
        let short_iv = SymmetricKey::new(vec![0u8; 16], Some(vec![0u8; 8]));

        assert!(with_iv.iv_for(Mode::Cbc, 16).unwrap().is_some());
        assert_eq!(
            with_iv.iv_for(Mode::Ecb, 16).unwrap_err(),
            Error::Validation(ValidationError::UnexpectedIv)
        );
        assert_eq!(
            without_iv.iv_for(Mode::Cbc, 16).unwrap_err(),
            Error::Validation(ValidationError::MissingIv)
        );
        assert_eq!(
            short_iv.iv_for(Mode::Cbc, 16).unwrap_err(),
            Error::Validation(ValidationError::InvalidIvLength {
                expected: 16,
                actual: 8
            })
        );
    }

    #[test]
    fn test_key_material_roundtrip() {
        let key = SymmetricKey::new((0u8..16).collect::<Vec<u8>>(), Some(vec![0xAB; 16]));
        let material = key.to_key_material(BlockCipherKind::Aes);
        assert!(material.contains(AES_KEY));
        assert!(material.contains(AES_IV));

        let parsed = SymmetricKey::from_key_material(&material, BlockCipherKind::Aes, 128).unwrap();
        assert_eq!(parsed, key);

        let err = SymmetricKey::from_key_material(&material, BlockCipherKind::Des, 64).unwrap_err();
        assert_eq!(err, Error::missing_key("DES_KEY"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = SymmetricKey::new(vec![0x42; 16], None);
        let printed = format!("{:?}", key);
        assert!(printed.contains("key_bits: 128"));
        assert!(!printed.contains("66"));
    }
}
