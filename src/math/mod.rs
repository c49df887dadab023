// Number theory shared by RSA, Diffie-Hellman and signatures

pub mod bigint;
pub mod number_theory;
pub mod prime;

pub use bigint::BigUnsignedInteger;
pub use number_theory::{gcd, lcm, mod_exp, mod_inverse};
pub use prime::{
    is_probably_prime, is_probably_prime_with, random_in_range, random_prime, random_prime_with,
    random_safe_prime_with, PrimeSearch, DEFAULT_MR_ROUNDS,
};
