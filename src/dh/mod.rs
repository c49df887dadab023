// Diffie-Hellman key exchange

pub mod exchange;
pub mod params;

pub use exchange::{
    compute_shared_secret, generate_key_pair, generate_key_pair_with_rng, DhKeyPair,
    DiffieHellman,
};
pub use params::DhParameters;
