// RSA Key Generation
// Key types, their key-material form, and prime-pair generation

use rand::{CryptoRng, RngCore};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::RsaConfig;
use crate::error::{Error, KeyGenerationError, Result};
use crate::key_material::{KeyMaterial, DEC_EXPONENT, ENC_EXPONENT, MODULUS};
use crate::math::prime::{draw_prime, local_rng};
use crate::math::{gcd, mod_inverse, BigUnsignedInteger, PrimeSearch};

/// Smallest modulus accepted by the generator
pub const MIN_BIT_LENGTH: u32 = 512;
/// Largest modulus accepted by the generator
pub const MAX_BIT_LENGTH: u32 = 8192;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    e: BigUnsignedInteger,
    n: BigUnsignedInteger,
}

impl RsaPublicKey {
    /// Fails with `MissingKey` if either value is zero.
    pub fn new(e: BigUnsignedInteger, n: BigUnsignedInteger) -> Result<Self> {
        if e.is_zero() {
            return Err(Error::missing_key(ENC_EXPONENT));
        }
        if n.is_zero() {
            return Err(Error::missing_key(MODULUS));
        }
        Ok(Self { e, n })
    }

    pub fn e(&self) -> &BigUnsignedInteger {
        &self.e
    }

    pub fn n(&self) -> &BigUnsignedInteger {
        &self.n
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Modulus length in whole bytes
    pub fn byte_length(&self) -> usize {
        ((self.n.bits() + 7) / 8) as usize
    }

    pub fn to_key_material(&self) -> KeyMaterial {
        KeyMaterial::new()
            .with(ENC_EXPONENT, self.e.clone())
            .with(MODULUS, self.n.clone())
    }

    pub fn from_key_material(material: &KeyMaterial) -> Result<Self> {
        Self::new(
            material.require(ENC_EXPONENT)?.clone(),
            material.require(MODULUS)?.clone(),
        )
    }
}

/// Pre-computed values for CRT decryption, present on generated keys only.
#[derive(Clone, PartialEq, Eq)]
pub struct CrtComponents {
    pub(crate) p: BigUnsignedInteger,
    pub(crate) q: BigUnsignedInteger,
    pub(crate) d_p: BigUnsignedInteger,   // d mod (p-1)
    pub(crate) d_q: BigUnsignedInteger,   // d mod (q-1)
    pub(crate) q_inv: BigUnsignedInteger, // q^(-1) mod p
}

impl CrtComponents {
    /// Larger prime factor
    pub fn p(&self) -> &BigUnsignedInteger {
        &self.p
    }

    /// Smaller prime factor
    pub fn q(&self) -> &BigUnsignedInteger {
        &self.q
    }
}

/// RSA Private Key
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    d: BigUnsignedInteger,
    n: BigUnsignedInteger,
    crt: Option<CrtComponents>,
}

impl RsaPrivateKey {
    /// Key without CRT components; decryption uses plain exponentiation.
    pub fn new(d: BigUnsignedInteger, n: BigUnsignedInteger) -> Result<Self> {
        if d.is_zero() {
            return Err(Error::missing_key(DEC_EXPONENT));
        }
        if n.is_zero() {
            return Err(Error::missing_key(MODULUS));
        }
        Ok(Self { d, n, crt: None })
    }

    pub fn d(&self) -> &BigUnsignedInteger {
        &self.d
    }

    pub fn n(&self) -> &BigUnsignedInteger {
        &self.n
    }

    pub fn crt(&self) -> Option<&CrtComponents> {
        self.crt.as_ref()
    }

    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    pub fn byte_length(&self) -> usize {
        ((self.n.bits() + 7) / 8) as usize
    }

    /// Only `d` and `n` are exported; the CRT values stay with this instance.
    pub fn to_key_material(&self) -> KeyMaterial {
        KeyMaterial::new()
            .with(DEC_EXPONENT, self.d.clone())
            .with(MODULUS, self.n.clone())
    }

    pub fn from_key_material(material: &KeyMaterial) -> Result<Self> {
        Self::new(
            material.require(DEC_EXPONENT)?.clone(),
            material.require(MODULUS)?.clone(),
        )
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("bit_length", &self.bit_length())
            .field("crt", &self.crt.is_some())
            .finish_non_exhaustive()
    }
}

/// RSA Key Pair (both public and private keys)
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
    pub bit_length: u32,
}

impl RsaKeyPair {
    /// Get the bit length of the key
    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    /// All three fields in one mapping: `ENC_EXPONENT`, `DEC_EXPONENT`, `MODULUS`.
    pub fn to_key_material(&self) -> KeyMaterial {
        let mut material = self.public_key.to_key_material();
        material.extend(self.private_key.to_key_material());
        material
    }
}

/// Generate an RSA key pair of `bit_length` bits with e = 65537.
pub fn generate_keypair(bit_length: u32) -> Result<RsaKeyPair> {
    let config = RsaConfig::default().with_bit_length(bit_length);
    generate_keypair_with(&config, &mut local_rng(), &PrimeSearch::default())
}

/// Generate an RSA key pair using `config`, drawing randomness from `rng`.
///
/// The modulus has exactly `config.bit_length` bits. A drawn prime is
/// rejected when it equals the other prime or when `p - 1` shares a factor
/// with `e`; the first rejection beyond `config.max_retries` fails with
/// `RetriesExhausted`. `search` can cancel or time-bound the prime search.
pub fn generate_keypair_with<R: RngCore + CryptoRng>(
    config: &RsaConfig,
    rng: &mut R,
    search: &PrimeSearch,
) -> Result<RsaKeyPair> {
    let bit_length = config.bit_length;
    check_bit_length(bit_length)?;
    if config.public_exponent < 3 || config.public_exponent % 2 == 0 {
        return Err(Error::invalid_parameter(
            "public exponent must be odd and at least 3",
        ));
    }
    if config.miller_rabin_rounds == 0 {
        return Err(Error::invalid_parameter("Miller-Rabin needs at least one round"));
    }

    info!(bit_length, "generating RSA key pair");
    let e = BigUnsignedInteger::from_u64(config.public_exponent);
    let search = search.clone().with_rounds(config.miller_rabin_rounds);
    let half_bits = bit_length / 2;

    let mut first: Option<BigUnsignedInteger> = None;
    let mut rejected = 0u32;
    loop {
        // Two top bits set on both primes gives n exactly bit_length bits
        let candidate = draw_prime(half_bits, 2, rng, &search)?;
        let usable = gcd(&e, &minus_one(&candidate)).is_one()
            && first.as_ref() != Some(&candidate);

        if !usable {
            rejected += 1;
            debug!(rejected, "prime rejected");
            if rejected > config.max_retries {
                warn!(rejected, "RSA key generation retry budget exhausted");
                return Err(KeyGenerationError::RetriesExhausted { attempts: rejected }.into());
            }
            continue;
        }

        match first.take() {
            None => first = Some(candidate),
            Some(p) => {
                let keypair = assemble(p, candidate, e, bit_length)?;
                info!(bit_length, rejected, "RSA key pair generated");
                return Ok(keypair);
            }
        }
    }
}

fn check_bit_length(bits: u32) -> Result<()> {
    if bits < MIN_BIT_LENGTH || bits > MAX_BIT_LENGTH {
        return Err(KeyGenerationError::InvalidBitLength {
            bits,
            reason: "must be within [512, 8192]",
        }
        .into());
    }
    if bits % 2 != 0 {
        return Err(KeyGenerationError::InvalidBitLength {
            bits,
            reason: "must be even so p and q have equal length",
        }
        .into());
    }
    Ok(())
}

// Caller guarantees x >= 1
fn minus_one(x: &BigUnsignedInteger) -> BigUnsignedInteger {
    BigUnsignedInteger::from(x.as_biguint() - 1u8)
}

/// Build the key pair from two distinct primes, each coprime to e after
/// subtracting one.
fn assemble(
    a: BigUnsignedInteger,
    b: BigUnsignedInteger,
    e: BigUnsignedInteger,
    bit_length: u32,
) -> Result<RsaKeyPair> {
    // Ensure p > q (for q_inv calculation)
    let (p, q) = if a > b { (a, b) } else { (b, a) };

    let n = &p * &q;
    let p_minus_1 = minus_one(&p);
    let q_minus_1 = minus_one(&q);
    let phi_n = &p_minus_1 * &q_minus_1;

    let d = mod_inverse(&e, &phi_n)?;
    let d_p = &d % &p_minus_1;
    let d_q = &d % &q_minus_1;
    let q_inv = mod_inverse(&q, &p)?;

    debug_assert_eq!(n.bits(), u64::from(bit_length));

    let public_key = RsaPublicKey { e, n: n.clone() };
    let private_key = RsaPrivateKey {
        d,
        n,
        crt: Some(CrtComponents {
            p,
            q,
            d_p,
            d_q,
            q_inv,
        }),
    };

    Ok(RsaKeyPair {
        public_key,
        private_key,
        bit_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn test_key_generation() {
        let keypair = generate_keypair(512).unwrap();
        assert_eq!(keypair.bit_length(), 512);
        assert_eq!(keypair.public_key.bit_length(), 512);
        assert_eq!(keypair.public_key.e(), &BigUnsignedInteger::from_u64(65537));
        assert!(keypair.private_key.crt().is_some());
    }

    #[test]
    fn test_key_properties() {
        let config = RsaConfig::default()
            .with_bit_length(512)
            .with_public_exponent(17);
        let keypair =
            generate_keypair_with(&config, &mut local_rng(), &PrimeSearch::default()).unwrap();
        let crt = keypair.private_key.crt().unwrap();

        // Verify n = p * q with p > q
        assert_eq!(keypair.private_key.n(), &(crt.p() * crt.q()));
        assert!(crt.p() > crt.q());

        // Verify e * d ≡ 1 (mod φ(n))
        let phi_n = &minus_one(crt.p()) * &minus_one(crt.q());
        let product = keypair.public_key.e() * keypair.private_key.d();
        assert!((&product % &phi_n).is_one());

        // q * q_inv ≡ 1 (mod p)
        assert!((&(crt.q() * &crt.q_inv) % crt.p()).is_one());
    }

    #[test]
    fn test_rejects_bad_bit_lengths() {
        for bits in [256, 513, 8194] {
            let err = generate_keypair(bits).unwrap_err();
            assert!(matches!(
                err,
                Error::KeyGeneration(KeyGenerationError::InvalidBitLength { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_bad_exponent() {
        let config = RsaConfig::default().with_bit_length(512).with_public_exponent(4);
        let err = generate_keypair_with(&config, &mut local_rng(), &PrimeSearch::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let config = RsaConfig::default().with_bit_length(512).with_miller_rabin_rounds(0);
        let err = generate_keypair_with(&config, &mut local_rng(), &PrimeSearch::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_retry_budget_exhausted() {
        // With e = 3 about half of all primes have 3 | p - 1. A zero budget
        // fails on the first such draw, so some seed in the range must hit it.
        let config = RsaConfig::default()
            .with_bit_length(512)
            .with_public_exponent(3)
            .with_max_retries(0);
        let err = (0..64u64)
            .find_map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                generate_keypair_with(&config, &mut rng, &PrimeSearch::default()).err()
            })
            .unwrap();
        assert_eq!(
            err,
            Error::KeyGeneration(KeyGenerationError::RetriesExhausted { attempts: 1 })
        );
    }

    #[test]
    fn test_cancelled_search() {
        let flag = Arc::new(AtomicBool::new(true));
        let search = PrimeSearch::new().with_cancel_flag(flag);
        let config = RsaConfig::default().with_bit_length(1024);
        let err = generate_keypair_with(&config, &mut local_rng(), &search).unwrap_err();
        assert_eq!(err, Error::KeyGeneration(KeyGenerationError::Cancelled));
    }

    #[test]
    fn test_key_material_roundtrip() {
        let keypair = generate_keypair(512).unwrap();
        let material = keypair.to_key_material();
        assert_eq!(material.len(), 3);

        let public = RsaPublicKey::from_key_material(&material).unwrap();
        let private = RsaPrivateKey::from_key_material(&material).unwrap();
        assert_eq!(public, keypair.public_key);
        assert_eq!(private.d(), keypair.private_key.d());
        assert!(private.crt().is_none());
    }

    #[test]
    fn test_missing_fields() {
        let material = KeyMaterial::new().with(MODULUS, BigUnsignedInteger::from_u64(3233));
        assert_eq!(
            RsaPublicKey::from_key_material(&material).unwrap_err(),
            Error::missing_key(ENC_EXPONENT)
        );

        let material = material.with(DEC_EXPONENT, BigUnsignedInteger::zero());
        assert_eq!(
            RsaPrivateKey::from_key_material(&material).unwrap_err(),
            Error::missing_key(DEC_EXPONENT)
        );
    }

    #[test]
    fn test_debug_redacts_private_exponent() {
        let key = RsaPrivateKey::new(
            BigUnsignedInteger::from_u64(2753),
            BigUnsignedInteger::from_u64(3233),
        )
        .unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("ac1"));
        assert!(!printed.contains("2753"));
    }
}
