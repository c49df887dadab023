// Diffie-Hellman exchange
// Key pairs and shared-secret derivation with peer value validation

use rand::{CryptoRng, RngCore};
use std::fmt;
use tracing::debug;

use super::params::DhParameters;
use crate::error::{Error, Result, ValidationError};
use crate::key_material::{KeyMaterial, DH_PUBLIC, DH_SECRET};
use crate::math::prime::local_rng;
use crate::math::{mod_exp, random_in_range, BigUnsignedInteger};

/// A secret exponent and its public value `g^secret mod p`.
#[derive(Clone, PartialEq, Eq)]
pub struct DhKeyPair {
    secret: BigUnsignedInteger,
    public: BigUnsignedInteger,
}

impl DhKeyPair {
    /// Rebuild a key pair from a known secret in `[2, p-2]`.
    pub fn from_secret(secret: BigUnsignedInteger, params: &DhParameters) -> Result<Self> {
        if secret.is_zero() {
            return Err(Error::missing_key(DH_SECRET));
        }
        if !params.in_exchange_range(&secret) {
            return Err(Error::invalid_parameter("DH secret must be in [2, p-2]"));
        }
        let public = mod_exp(params.g(), &secret, params.p())?;
        Ok(Self { secret, public })
    }

    pub fn secret(&self) -> &BigUnsignedInteger {
        &self.secret
    }

    pub fn public(&self) -> &BigUnsignedInteger {
        &self.public
    }

    pub fn to_key_material(&self) -> KeyMaterial {
        KeyMaterial::new()
            .with(DH_SECRET, self.secret.clone())
            .with(DH_PUBLIC, self.public.clone())
    }

    /// Only the secret is read; the public value is recomputed from it.
    pub fn from_key_material(material: &KeyMaterial, params: &DhParameters) -> Result<Self> {
        Self::from_secret(material.require(DH_SECRET)?.clone(), params)
    }
}

impl fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Key pair with a secret drawn uniformly from `[2, p-2]`.
pub fn generate_key_pair(params: &DhParameters) -> Result<DhKeyPair> {
    generate_key_pair_with_rng(params, &mut local_rng())
}

pub fn generate_key_pair_with_rng<R: RngCore + CryptoRng>(
    params: &DhParameters,
    rng: &mut R,
) -> Result<DhKeyPair> {
    let two = BigUnsignedInteger::from_u64(2);
    let upper = params
        .p()
        .checked_sub(&two)
        .ok_or_else(|| Error::invalid_parameter("DH modulus too small"))?;
    let secret = random_in_range(&two, &upper, rng)?;
    let public = mod_exp(params.g(), &secret, params.p())?;
    debug!(bit_length = params.bit_length(), "DH key pair generated");
    Ok(DhKeyPair { secret, public })
}

/// `peer_public^own_secret mod p`, after checking `peer_public` is in
/// `[2, p-2]`. Values outside it (0, 1, p-1, or >= p) fail with
/// `ExchangeValidation`.
pub fn compute_shared_secret(
    own_secret: &BigUnsignedInteger,
    peer_public: &BigUnsignedInteger,
    params: &DhParameters,
) -> Result<BigUnsignedInteger> {
    if own_secret.is_zero() {
        return Err(Error::missing_key(DH_SECRET));
    }
    if !params.in_exchange_range(peer_public) {
        debug!("rejected peer public value");
        return Err(ValidationError::ExchangeValidation.into());
    }
    mod_exp(peer_public, own_secret, params.p())
}

/// Exchange session over one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffieHellman {
    params: DhParameters,
}

impl DiffieHellman {
    pub fn new(params: DhParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DhParameters {
        &self.params
    }

    pub fn generate_key_pair(&self) -> Result<DhKeyPair> {
        generate_key_pair(&self.params)
    }

    pub fn compute_shared_secret(
        &self,
        own: &DhKeyPair,
        peer_public: &BigUnsignedInteger,
    ) -> Result<BigUnsignedInteger> {
        compute_shared_secret(own.secret(), peer_public, &self.params)
    }
}
