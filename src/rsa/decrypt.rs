// RSA Decryption Implementation
// Private-key exponentiation (CRT when available) and OAEP decoding

use super::keygen::{CrtComponents, RsaPrivateKey};
use super::oaep::{self, OaepHash};
use crate::error::{Result, ValidationError};
use crate::math::{mod_exp, BigUnsignedInteger};

/// Decrypt `ciphertext`, reversing OAEP when `use_oaep` is set.
pub fn decrypt(
    ciphertext: &BigUnsignedInteger,
    private_key: &RsaPrivateKey,
    use_oaep: bool,
) -> Result<BigUnsignedInteger> {
    if use_oaep {
        decrypt_oaep(ciphertext, private_key, OaepHash::default(), &[])
    } else {
        private_op(ciphertext, private_key)
    }
}

/// OAEP decryption with the label used at encryption time.
pub fn decrypt_with_label(
    ciphertext: &BigUnsignedInteger,
    private_key: &RsaPrivateKey,
    label: &[u8],
) -> Result<BigUnsignedInteger> {
    decrypt_oaep(ciphertext, private_key, OaepHash::default(), label)
}

/// OAEP decryption under the hash and label used at encryption time.
pub fn decrypt_oaep(
    ciphertext: &BigUnsignedInteger,
    private_key: &RsaPrivateKey,
    hash: OaepHash,
    label: &[u8],
) -> Result<BigUnsignedInteger> {
    let message = decrypt_padded(ciphertext, private_key, hash, label)?;
    Ok(BigUnsignedInteger::from_bytes_be(&message))
}

/// Inverse of [`encrypt_bytes`](super::encrypt_bytes). In raw mode the result
/// is the minimal big-endian form of the recovered integer.
pub fn decrypt_bytes(
    ciphertext: &BigUnsignedInteger,
    private_key: &RsaPrivateKey,
    use_oaep: bool,
) -> Result<Vec<u8>> {
    if use_oaep {
        decrypt_padded(ciphertext, private_key, OaepHash::default(), &[])
    } else {
        let m = private_op(ciphertext, private_key)?;
        if m.is_zero() {
            return Ok(Vec::new());
        }
        Ok(m.to_bytes_be())
    }
}

fn decrypt_padded(
    ciphertext: &BigUnsignedInteger,
    private_key: &RsaPrivateKey,
    hash: OaepHash,
    label: &[u8],
) -> Result<Vec<u8>> {
    let k = private_key.byte_length();
    let m = private_op(ciphertext, private_key)?;
    // m < n always fits in k bytes
    let encoded = m
        .to_bytes_be_padded(k)
        .ok_or(ValidationError::MessageTooLarge)?;
    oaep::decode(&encoded, label, k, hash)
}

/// `c^d mod n`, through CRT when the key carries its factors.
pub(crate) fn private_op(
    c: &BigUnsignedInteger,
    key: &RsaPrivateKey,
) -> Result<BigUnsignedInteger> {
    if c >= key.n() {
        return Err(ValidationError::MessageTooLarge.into());
    }
    match key.crt() {
        Some(crt) => decrypt_crt(c, crt),
        None => mod_exp(c, key.d(), key.n()),
    }
}

/// Decrypt using Chinese Remainder Theorem (CRT)
/// Works on half-size numbers, roughly four times faster than c^d mod n
fn decrypt_crt(c: &BigUnsignedInteger, crt: &CrtComponents) -> Result<BigUnsignedInteger> {
    // m1 = c^d_p mod p
    let m1 = mod_exp(c, &crt.d_p, &crt.p)?;

    // m2 = c^d_q mod q
    let m2 = mod_exp(c, &crt.d_q, &crt.q)?;

    // h = (m1 - m2) * q_inv mod p, lifted by p so it never goes negative
    let m2_mod_p = &m2 % &crt.p;
    let lifted = m1.as_biguint() + crt.p.as_biguint();
    let diff = BigUnsignedInteger::from(lifted - m2_mod_p.as_biguint());
    let h = &(&diff * &crt.q_inv) % &crt.p;

    // m = m2 + q * h, already below n = p * q
    Ok(&m2 + &(&crt.q * &h))
}
