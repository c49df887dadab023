// Error types
// Every fallible operation in the crate returns one of these; none of them carry key material.

use std::fmt;
use thiserror::Error;

/// Input rejected before any cryptographic work is done.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {cipher} key length: {bits} bits")]
    InvalidKeyLength { cipher: &'static str, bits: usize },

    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("an IV is required in CBC mode")]
    MissingIv,

    #[error("ECB mode does not take an IV")]
    UnexpectedIv,

    #[error("missing or zero key field: {0}")]
    MissingKey(String),

    #[error("peer public value is outside [2, p-2]")]
    ExchangeValidation,

    #[error("message is too large for the modulus")]
    MessageTooLarge,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("block value does not fit the cipher block size")]
    BlockOutOfRange,

    #[error("unsupported primitive: {0}")]
    UnsupportedPrimitive(String),
}

/// A cryptographic transform ran but its output is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoOperationError {
    #[error("invalid padding")]
    InvalidPadding,

    #[error("OAEP decoding failed: {0}")]
    OaepDecoding(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero modulus")]
    DivisionByZero,

    #[error("no modular inverse exists")]
    NoInverse,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyGenerationError {
    #[error("retry budget exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("prime search was cancelled")]
    Cancelled,

    #[error("prime search deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid bit length {bits}: {reason}")]
    InvalidBitLength { bits: u32, reason: &'static str },
}

/// Top-level error for the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("crypto operation error: {0}")]
    CryptoOperation(#[from] CryptoOperationError),

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("key generation error: {0}")]
    KeyGeneration(#[from] KeyGenerationError),
}

/// Coarse classification of an [`Error`], for callers that map failures to
/// messages or exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    CryptoOperation,
    Arithmetic,
    KeyGeneration,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation(_) => ErrorCategory::Validation,
            Error::CryptoOperation(_) => ErrorCategory::CryptoOperation,
            Error::Arithmetic(_) => ErrorCategory::Arithmetic,
            Error::KeyGeneration(_) => ErrorCategory::KeyGeneration,
        }
    }

    pub(crate) fn missing_key(field: &str) -> Self {
        ValidationError::MissingKey(field.to_string()).into()
    }

    pub(crate) fn invalid_parameter(reason: impl Into<String>) -> Self {
        ValidationError::InvalidParameter(reason.into()).into()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::CryptoOperation => "crypto operation",
            ErrorCategory::Arithmetic => "arithmetic",
            ErrorCategory::KeyGeneration => "key generation",
        };
        f.write_str(name)
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
