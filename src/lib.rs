// Cryptoran Core
// From-scratch block ciphers, RSA, Diffie-Hellman and RSA signatures

//! Cryptographic primitives implemented from first principles:
//!
//! - [`block`]: AES and DES with ECB/CBC chaining and block padding
//! - [`rsa`]: key generation, raw and OAEP encryption, CRT decryption
//! - [`dh`]: Diffie-Hellman parameters and shared-secret derivation
//! - [`signature`]: RSA signatures over a document's integer form
//!
//! Every operation takes its key material as an argument and returns a
//! typed [`Error`] on failure. Nothing here performs I/O; converting keys to
//! and from a persisted form goes through [`KeyMaterial`].
//!
//! None of the arithmetic is constant-time.

pub mod block;
pub mod config;
pub mod dh;
pub mod error;
pub mod key_material;
pub mod math;
pub mod primitive;
pub mod rsa;
pub mod signature;

pub use block::{BlockCipherEngine, BlockCipherKind, CipherStream, Mode, SymmetricKey};
pub use config::{BlockCipherConfig, RsaConfig, SignatureConfig};
pub use dh::{DhKeyPair, DhParameters, DiffieHellman};
pub use error::{Error, ErrorCategory, Result};
pub use key_material::KeyMaterial;
pub use math::{BigUnsignedInteger, PrimeSearch};
pub use primitive::{Primitive, PrimitiveCategory};
pub use rsa::{OaepHash, RsaCryptosystem, RsaKeyPair, RsaPrivateKey, RsaPublicKey};
pub use signature::{RsaSigner, Signature};
