// Diffie-Hellman group parameters
// Validated (p, g) pairs: caller supplied, generated, or the RFC 3526 2048-bit group

use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};
use tracing::info;

use crate::error::{Error, KeyGenerationError, Result};
use crate::key_material::{KeyMaterial, DH_GENERATOR, DH_PRIME};
use crate::math::prime::local_rng;
use crate::math::{
    is_probably_prime, mod_exp, random_in_range, random_safe_prime_with, BigUnsignedInteger,
    PrimeSearch, DEFAULT_MR_ROUNDS,
};

/// Smallest prime size `generate` accepts
pub const MIN_GROUP_BITS: u32 = 16;

/// RFC 3526 group 14 prime (2048-bit MODP), generator 2
const MODP_2048_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

/// Group parameters: prime modulus `p` and generator `g` in `[2, p-2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhParameters {
    p: BigUnsignedInteger,
    g: BigUnsignedInteger,
}

impl DhParameters {
    /// Validate caller-supplied parameters: `p` must be a probable prime
    /// above 3 and `g` must lie in `[2, p-2]`.
    pub fn new(p: BigUnsignedInteger, g: BigUnsignedInteger) -> Result<Self> {
        if p.is_zero() {
            return Err(Error::missing_key(DH_PRIME));
        }
        if g.is_zero() {
            return Err(Error::missing_key(DH_GENERATOR));
        }
        if p <= BigUnsignedInteger::from_u64(3) || !is_probably_prime(&p, DEFAULT_MR_ROUNDS) {
            return Err(Error::invalid_parameter("DH modulus must be a prime above 3"));
        }

        let params = Self { p, g };
        if !params.in_exchange_range(&params.g) {
            return Err(Error::invalid_parameter("DH generator must be in [2, p-2]"));
        }
        Ok(params)
    }

    /// Fresh group: a safe prime `p = 2q + 1` of `bits` bits and a generator
    /// of the order-q subgroup.
    pub fn generate(bits: u32) -> Result<Self> {
        Self::generate_with(bits, &mut local_rng(), &PrimeSearch::default())
    }

    pub fn generate_with<R: RngCore + CryptoRng>(
        bits: u32,
        rng: &mut R,
        search: &PrimeSearch,
    ) -> Result<Self> {
        if bits < MIN_GROUP_BITS {
            return Err(KeyGenerationError::InvalidBitLength {
                bits,
                reason: "a DH group needs at least 16 bits",
            }
            .into());
        }

        info!(bit_length = bits, "generating DH parameters");
        let p = random_safe_prime_with(bits, rng, search)?;
        let two = BigUnsignedInteger::from_u64(2);
        let p_minus_2 = BigUnsignedInteger::from(p.as_biguint() - 2u8);

        // Squares generate the prime-order subgroup; h = ±1 is excluded by the range
        let mut params = Self {
            p,
            g: BigUnsignedInteger::zero(),
        };
        loop {
            let h = random_in_range(&two, &p_minus_2, rng)?;
            let g = mod_exp(&h, &two, &params.p)?;
            if params.in_exchange_range(&g) {
                params.g = g;
                break;
            }
        }

        info!(bit_length = bits, "DH parameters generated");
        Ok(params)
    }

    /// The 2048-bit MODP group from RFC 3526 (group 14), `g = 2`.
    pub fn modp_2048() -> Self {
        let p = MODP_2048_PRIME
            .chars()
            .filter_map(|c| c.to_digit(16))
            .fold(BigUint::zero(), |acc, digit| (acc << 4u32) + digit);
        Self {
            p: p.into(),
            g: BigUnsignedInteger::from_u64(2),
        }
    }

    pub fn p(&self) -> &BigUnsignedInteger {
        &self.p
    }

    pub fn g(&self) -> &BigUnsignedInteger {
        &self.g
    }

    pub fn bit_length(&self) -> u64 {
        self.p.bits()
    }

    /// True when `value` lies in `[2, p-2]`.
    pub(crate) fn in_exchange_range(&self, value: &BigUnsignedInteger) -> bool {
        let two = BigUnsignedInteger::from_u64(2);
        match self.p.checked_sub(&two) {
            Some(upper) => value >= &two && value <= &upper,
            None => false,
        }
    }

    pub fn to_key_material(&self) -> KeyMaterial {
        KeyMaterial::new()
            .with(DH_PRIME, self.p.clone())
            .with(DH_GENERATOR, self.g.clone())
    }

    pub fn from_key_material(material: &KeyMaterial) -> Result<Self> {
        Self::new(
            material.require(DH_PRIME)?.clone(),
            material.require(DH_GENERATOR)?.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn big(n: u64) -> BigUnsignedInteger {
        BigUnsignedInteger::from_u64(n)
    }

    #[test]
    fn test_new_validates() {
        assert!(DhParameters::new(big(23), big(5)).is_ok());
        assert!(DhParameters::new(big(23), big(21)).is_ok());

        for (p, g) in [(21, 5), (3, 2), (23, 1), (23, 22)] {
            assert!(matches!(
                DhParameters::new(big(p), big(g)).unwrap_err(),
                Error::Validation(ValidationError::InvalidParameter(_))
            ));
        }
        assert_eq!(
            DhParameters::new(big(23), big(0)).unwrap_err(),
            Error::missing_key(DH_GENERATOR)
        );
    }

    #[test]
    fn test_modp_2048() {
        let params = DhParameters::modp_2048();
        assert_eq!(params.bit_length(), 2048);
        assert_eq!(params.g(), &big(2));
        assert!(params.p().is_odd());
        assert_eq!(
            format!("{:X}", params.p()),
            MODP_2048_PRIME
        );
    }

    #[test]
    fn test_generate_rejects_zero_rounds() {
        let search = PrimeSearch::new().with_rounds(0);
        let err = DhParameters::generate_with(64, &mut local_rng(), &search).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_generate_safe_group() {
        let params = DhParameters::generate(64).unwrap();
        assert_eq!(params.bit_length(), 64);

        // g has order q = (p-1)/2: g^q = 1
        let q = BigUnsignedInteger::from(params.p().as_biguint() >> 1u32);
        assert!(mod_exp(params.g(), &q, params.p()).unwrap().is_one());
        assert!(is_probably_prime(&q, 40));
    }

    #[test]
    fn test_generate_rejects_tiny_groups() {
        assert!(matches!(
            DhParameters::generate(8).unwrap_err(),
            Error::KeyGeneration(KeyGenerationError::InvalidBitLength { bits: 8, .. })
        ));
    }

    #[test]
    fn test_key_material_roundtrip() {
        let params = DhParameters::new(big(23), big(5)).unwrap();
        let material = params.to_key_material();
        assert_eq!(DhParameters::from_key_material(&material).unwrap(), params);
    }
}
