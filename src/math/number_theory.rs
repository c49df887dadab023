// Modular Arithmetic
// Exponentiation, inverses and gcd over BigUnsignedInteger

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use super::bigint::BigUnsignedInteger;
use crate::error::{ArithmeticError, Result};

/// Modular exponentiation: base^exp mod modulus
/// Uses square-and-multiply algorithm
pub fn mod_exp(
    base: &BigUnsignedInteger,
    exponent: &BigUnsignedInteger,
    modulus: &BigUnsignedInteger,
) -> Result<BigUnsignedInteger> {
    let modulus = modulus.as_biguint();
    if modulus.is_zero() {
        return Err(ArithmeticError::DivisionByZero.into());
    }
    if modulus.is_one() {
        return Ok(BigUnsignedInteger::zero());
    }

    let mut result = BigUint::one();
    let mut base = base.as_biguint() % modulus;
    let mut exp = exponent.as_biguint().clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    Ok(result.into())
}

/// Compute modular inverse: a^(-1) mod m
///
/// Iterative extended Euclidean algorithm over signed integers.
pub fn mod_inverse(
    a: &BigUnsignedInteger,
    modulus: &BigUnsignedInteger,
) -> Result<BigUnsignedInteger> {
    let m = modulus.as_biguint();
    if m.is_zero() {
        return Err(ArithmeticError::DivisionByZero.into());
    }
    if m.is_one() {
        return Ok(BigUnsignedInteger::zero());
    }

    let m_signed = BigInt::from_biguint(Sign::Plus, m.clone());
    let (mut old_r, mut r) = (
        BigInt::from_biguint(Sign::Plus, a.as_biguint() % m),
        m_signed.clone(),
    );
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(ArithmeticError::NoInverse.into());
    }

    // mod_floor keeps the result in [0, m)
    let inverse = old_s.mod_floor(&m_signed);
    inverse
        .to_biguint()
        .map(BigUnsignedInteger::from)
        .ok_or_else(|| ArithmeticError::NoInverse.into())
}

/// Greatest common divisor
pub fn gcd(a: &BigUnsignedInteger, b: &BigUnsignedInteger) -> BigUnsignedInteger {
    a.as_biguint().gcd(b.as_biguint()).into()
}

/// Least common multiple
pub fn lcm(a: &BigUnsignedInteger, b: &BigUnsignedInteger) -> BigUnsignedInteger {
    if a.is_zero() || b.is_zero() {
        return BigUnsignedInteger::zero();
    }
    a.as_biguint().lcm(b.as_biguint()).into()
}
