// Primality testing and prime generation
// Miller-Rabin, random primes, safe primes and the search budget that bounds them

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::bigint::BigUnsignedInteger;
use super::number_theory::mod_exp;
use crate::error::{Error, KeyGenerationError, Result};

/// Miller-Rabin rounds used when the caller does not choose; error
/// probability at most 4^-40.
pub const DEFAULT_MR_ROUNDS: u32 = 40;

const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Fresh CSPRNG for one call path.
pub(crate) fn local_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Bounds an open-ended search (prime generation, key generation).
///
/// The search checks the budget before every candidate draw, so a deadline or
/// a raised cancel flag stops it within one primality test.
#[derive(Debug, Clone)]
pub struct PrimeSearch {
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
    rounds: u32,
}

impl Default for PrimeSearch {
    fn default() -> Self {
        Self {
            deadline: None,
            cancel: None,
            rounds: DEFAULT_MR_ROUNDS,
        }
    }
}

impl PrimeSearch {
    /// Unbounded search with the default number of Miller-Rabin rounds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Stop the search once `flag` is set to `true` (from any thread).
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Zero rounds would accept any candidate that survives trial division.
    fn check_rounds(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::invalid_parameter("Miller-Rabin needs at least one round"));
        }
        Ok(())
    }

    /// Fails if the search has been cancelled or its deadline has passed.
    pub fn check(&self) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                warn!("prime search cancelled");
                return Err(KeyGenerationError::Cancelled.into());
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                warn!("prime search deadline exceeded");
                return Err(KeyGenerationError::DeadlineExceeded.into());
            }
        }
        Ok(())
    }
}

/// Miller-Rabin primality test with a fresh random generator.
/// Returns true if n is probably prime
pub fn is_probably_prime(n: &BigUnsignedInteger, rounds: u32) -> bool {
    is_probably_prime_with(n, rounds, &mut local_rng())
}

/// Miller-Rabin primality test with `rounds` independent random witnesses.
///
/// Trial division by the primes below 256 runs first, so small inputs are
/// answered exactly.
pub fn is_probably_prime_with<R: RngCore + CryptoRng>(
    n: &BigUnsignedInteger,
    rounds: u32,
    rng: &mut R,
) -> bool {
    let n = n.as_biguint();
    if n < &BigUint::from(2u8) {
        return false;
    }

    for &p in SMALL_PRIMES.iter() {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let modulus = BigUnsignedInteger::from(n.clone());
    let d = BigUnsignedInteger::from(d);
    let two = BigUint::from(2u8);

    'witness: for _ in 0..rounds {
        // Pick random witness a in [2, n-2]
        let a = rng.gen_biguint_range(&two, &n_minus_one);

        // n > 2 here, so the modulus is non-zero
        let mut x = match mod_exp(&a.into(), &d, &modulus) {
            Ok(x) => x.into_biguint(),
            Err(_) => return false,
        };

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return false;
    }

    // Probably prime
    true
}

/// Generate a random prime of exactly `bit_length` bits.
pub fn random_prime(bit_length: u32) -> Result<BigUnsignedInteger> {
    random_prime_with(bit_length, &mut local_rng(), &PrimeSearch::default())
}

/// Generate a random prime of exactly `bit_length` bits using the caller's
/// generator, stopping early if `search` is cancelled or expires.
pub fn random_prime_with<R: RngCore + CryptoRng>(
    bit_length: u32,
    rng: &mut R,
    search: &PrimeSearch,
) -> Result<BigUnsignedInteger> {
    draw_prime(bit_length, 1, rng, search)
}

/// Prime with its `top_bits` most significant bits set. Two top bits make
/// the product of two such primes exactly twice as long.
pub(crate) fn draw_prime<R: RngCore + CryptoRng>(
    bit_length: u32,
    top_bits: u32,
    rng: &mut R,
    search: &PrimeSearch,
) -> Result<BigUnsignedInteger> {
    if bit_length < 2 {
        return Err(KeyGenerationError::InvalidBitLength {
            bits: bit_length,
            reason: "a prime needs at least 2 bits",
        }
        .into());
    }
    search.check_rounds()?;

    let mut attempts: u64 = 0;
    loop {
        search.check()?;
        attempts += 1;

        let candidate = random_odd_candidate(bit_length, top_bits, rng);
        if is_probably_prime_with(&candidate, search.rounds(), rng) {
            debug!(bit_length, attempts, "prime found");
            return Ok(candidate);
        }
    }
}

/// Generate a safe prime `p = 2q + 1` (q prime) of exactly `bit_length` bits.
pub fn random_safe_prime_with<R: RngCore + CryptoRng>(
    bit_length: u32,
    rng: &mut R,
    search: &PrimeSearch,
) -> Result<BigUnsignedInteger> {
    if bit_length < 3 {
        return Err(KeyGenerationError::InvalidBitLength {
            bits: bit_length,
            reason: "a safe prime needs at least 3 bits",
        }
        .into());
    }
    search.check_rounds()?;

    let mut attempts: u64 = 0;
    loop {
        search.check()?;
        attempts += 1;

        let q = random_odd_candidate(bit_length - 1, 1, rng);
        // Cheap single-round screens before the full test on both values
        if !is_probably_prime_with(&q, 1, rng) {
            continue;
        }
        let p = BigUnsignedInteger::from((q.as_biguint() << 1u32) + 1u8);
        if is_probably_prime_with(&p, 1, rng)
            && is_probably_prime_with(&q, search.rounds(), rng)
            && is_probably_prime_with(&p, search.rounds(), rng)
        {
            debug!(bit_length, attempts, "safe prime found");
            return Ok(p);
        }
    }
}

/// Uniform value in `[low, high]`.
pub fn random_in_range<R: RngCore + CryptoRng>(
    low: &BigUnsignedInteger,
    high: &BigUnsignedInteger,
    rng: &mut R,
) -> Result<BigUnsignedInteger> {
    if low > high {
        return Err(Error::invalid_parameter("empty sampling range"));
    }
    let upper = high.as_biguint() + 1u8;
    Ok(rng.gen_biguint_range(low.as_biguint(), &upper).into())
}

fn random_odd_candidate<R: RngCore + CryptoRng>(
    bit_length: u32,
    top_bits: u32,
    rng: &mut R,
) -> BigUnsignedInteger {
    let mut candidate = rng.gen_biguint(u64::from(bit_length));
    for i in 0..top_bits.min(bit_length) {
        candidate |= BigUint::one() << (bit_length - 1 - i);
    }
    candidate |= BigUint::one();
    candidate.into()
}
