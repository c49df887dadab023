// Big Integer Operations
// Wrapper around num-bigint shared by every public-key primitive

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{Num, One, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Rem};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Arbitrary-precision non-negative integer.
///
/// Immutable value type; arithmetic returns new values. Serialized as a
/// lowercase hex string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BigUnsignedInteger(BigUint);

impl BigUnsignedInteger {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn one() -> Self {
        Self(BigUint::one())
    }

    /// Create a big integer from u64
    pub fn from_u64(n: u64) -> Self {
        Self(BigUint::from(n))
    }

    /// Create a big integer from bytes (big-endian)
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// Minimal big-endian encoding; zero encodes as a single zero byte.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }

    /// Big-endian encoding left-padded with zeros to exactly `len` bytes.
    /// Returns `None` when the value needs more than `len` bytes.
    pub fn to_bytes_be_padded(&self, len: usize) -> Option<Vec<u8>> {
        if self.0.is_zero() {
            return Some(vec![0u8; len]);
        }
        let bytes = self.0.to_bytes_be();
        if bytes.len() > len {
            return None;
        }
        let mut out = vec![0u8; len - bytes.len()];
        out.extend_from_slice(&bytes);
        Some(out)
    }

    /// Parse a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        BigUint::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| Error::invalid_parameter("not a hexadecimal integer"))
    }

    /// Interpret UTF-8 text as a big-endian integer.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes_be(text.as_bytes())
    }

    /// Inverse of [`from_text`](Self::from_text). Leading NUL characters do not
    /// survive the round trip.
    pub fn to_text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        if self.0.is_zero() {
            return Ok(String::new());
        }
        String::from_utf8(self.0.to_bytes_be())
    }

    /// Number of significant bits (zero has none)
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn is_odd(&self) -> bool {
        self.0.is_odd()
    }

    pub fn is_even(&self) -> bool {
        self.0.is_even()
    }

    /// `self - other`, or `None` if the result would be negative.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.0 < other.0 {
            None
        } else {
            Some(Self(&self.0 - &other.0))
        }
    }

    pub(crate) fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub(crate) fn into_biguint(self) -> BigUint {
        self.0
    }
}

impl From<u64> for BigUnsignedInteger {
    fn from(n: u64) -> Self {
        Self::from_u64(n)
    }
}

impl From<u32> for BigUnsignedInteger {
    fn from(n: u32) -> Self {
        Self(BigUint::from(n))
    }
}

impl From<BigUint> for BigUnsignedInteger {
    fn from(n: BigUint) -> Self {
        Self(n)
    }
}

impl From<BigUnsignedInteger> for BigUint {
    fn from(n: BigUnsignedInteger) -> Self {
        n.0
    }
}

impl FromStr for BigUnsignedInteger {
    type Err = Error;

    /// Parses a decimal string.
    fn from_str(s: &str) -> Result<Self> {
        BigUint::from_str_radix(s.trim(), 10)
            .map(Self)
            .map_err(|_| Error::invalid_parameter("not a decimal integer"))
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl<'a> $trait<&'a BigUnsignedInteger> for &'a BigUnsignedInteger {
            type Output = BigUnsignedInteger;

            fn $method(self, rhs: &'a BigUnsignedInteger) -> BigUnsignedInteger {
                BigUnsignedInteger($trait::$method(&self.0, &rhs.0))
            }
        }

        impl $trait for BigUnsignedInteger {
            type Output = BigUnsignedInteger;

            fn $method(self, rhs: BigUnsignedInteger) -> BigUnsignedInteger {
                BigUnsignedInteger($trait::$method(self.0, rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Mul, mul);
// Panics on a zero divisor, like the primitive integer types.
forward_binop!(Rem, rem);

impl fmt::Display for BigUnsignedInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for BigUnsignedInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigUnsignedInteger({:#x})", self.0)
    }
}

impl fmt::LowerHex for BigUnsignedInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for BigUnsignedInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl Serialize for BigUnsignedInteger {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:x}", self.0))
    }
}

impl<'de> Deserialize<'de> for BigUnsignedInteger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
