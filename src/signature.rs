// RSA Signatures
// Sign and verify the integer form of a document; key generation reuses the RSA generator

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SignatureConfig;
use crate::error::{Error, Result, ValidationError};
use crate::key_material::{KeyMaterial, SIGNATURE};
use crate::math::prime::local_rng;
use crate::math::{mod_exp, BigUnsignedInteger, PrimeSearch};
use crate::rsa::decrypt::private_op;
use crate::rsa::{generate_keypair_with, RsaKeyPair, RsaPrivateKey, RsaPublicKey};

/// A signature value in `[0, n)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    value: BigUnsignedInteger,
}

impl Signature {
    pub fn new(value: BigUnsignedInteger) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &BigUnsignedInteger {
        &self.value
    }

    pub fn into_value(self) -> BigUnsignedInteger {
        self.value
    }

    pub fn to_key_material(&self) -> KeyMaterial {
        KeyMaterial::new().with(SIGNATURE, self.value.clone())
    }

    /// A zero signature is accepted here; it simply fails verification.
    pub fn from_key_material(material: &KeyMaterial) -> Result<Self> {
        material
            .get(SIGNATURE)
            .cloned()
            .map(Self::new)
            .ok_or_else(|| Error::missing_key(SIGNATURE))
    }
}

impl From<BigUnsignedInteger> for Signature {
    fn from(value: BigUnsignedInteger) -> Self {
        Self::new(value)
    }
}

/// Signing key pair of `bit_length` bits (see [`SignatureConfig`] for defaults).
pub fn generate_keys(bit_length: u32) -> Result<RsaKeyPair> {
    generate_keys_with(&SignatureConfig::default().with_bit_length(bit_length))
}

pub fn generate_keys_with(config: &SignatureConfig) -> Result<RsaKeyPair> {
    generate_keypair_with(&config.rsa_config(), &mut local_rng(), &PrimeSearch::default())
}

/// `s = m^d mod n` over the document's integer value. The document is not
/// hashed; it must already be below `n`.
pub fn sign(document: &BigUnsignedInteger, private_key: &RsaPrivateKey) -> Result<Signature> {
    if document >= private_key.n() {
        return Err(ValidationError::MessageTooLarge.into());
    }
    let value = private_op(document, private_key)?;
    debug!(bit_length = private_key.bit_length(), "document signed");
    Ok(Signature { value })
}

/// True iff `signature^e mod n` equals the document. Out-of-range inputs
/// verify as false rather than failing.
pub fn verify(
    document: &BigUnsignedInteger,
    signature: &Signature,
    public_key: &RsaPublicKey,
) -> bool {
    let n = public_key.n();
    if document >= n || signature.value() >= n {
        return false;
    }
    match mod_exp(signature.value(), public_key.e(), n) {
        Ok(recovered) => &recovered == document,
        Err(_) => false,
    }
}

/// Sign bytes read as a big-endian integer.
pub fn sign_bytes(document: &[u8], private_key: &RsaPrivateKey) -> Result<Signature> {
    sign(&BigUnsignedInteger::from_bytes_be(document), private_key)
}

pub fn verify_bytes(document: &[u8], signature: &Signature, public_key: &RsaPublicKey) -> bool {
    verify(&BigUnsignedInteger::from_bytes_be(document), signature, public_key)
}

/// Signature session under one configuration.
#[derive(Clone, Debug, Default)]
pub struct RsaSigner {
    config: SignatureConfig,
}

impl RsaSigner {
    pub fn new(config: SignatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignatureConfig {
        &self.config
    }

    pub fn generate_keys(&self) -> Result<RsaKeyPair> {
        generate_keys_with(&self.config)
    }

    pub fn sign(
        &self,
        document: &BigUnsignedInteger,
        private_key: &RsaPrivateKey,
    ) -> Result<Signature> {
        sign(document, private_key)
    }

    pub fn verify(
        &self,
        document: &BigUnsignedInteger,
        signature: &Signature,
        public_key: &RsaPublicKey,
    ) -> bool {
        verify(document, signature, public_key)
    }
}
