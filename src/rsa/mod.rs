// RSA Module - Main module file
// Key generation, raw and OAEP encryption, CRT decryption

pub mod cryptosystem;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod oaep;

pub use cryptosystem::RsaCryptosystem;
pub use decrypt::{decrypt, decrypt_bytes, decrypt_oaep, decrypt_with_label};
pub use encrypt::{encrypt, encrypt_bytes, encrypt_oaep, encrypt_with_label, encrypt_with_rng};
pub use keygen::{
    generate_keypair, generate_keypair_with, CrtComponents, RsaKeyPair, RsaPrivateKey,
    RsaPublicKey,
};
pub use oaep::OaepHash;
