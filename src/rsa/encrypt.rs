// RSA Encryption Implementation
// Raw (textbook) or OAEP-padded encryption under a public key

use rand::{CryptoRng, RngCore};
use tracing::debug;

use super::keygen::RsaPublicKey;
use super::oaep::{self, OaepHash};
use crate::error::{Result, ValidationError};
use crate::math::prime::local_rng;
use crate::math::{mod_exp, BigUnsignedInteger};

/// Encrypt an integer message: `m^e mod n`, OAEP-encoded first when
/// `use_oaep` is set (SHA-1 MGF1, empty label).
///
/// Raw mode is deterministic and malleable; use it for interoperability,
/// not confidentiality. It requires `message < n`.
pub fn encrypt(
    message: &BigUnsignedInteger,
    public_key: &RsaPublicKey,
    use_oaep: bool,
) -> Result<BigUnsignedInteger> {
    encrypt_with_rng(message, public_key, use_oaep, &[], &mut local_rng())
}

/// OAEP encryption bound to `label`; decryption must present the same label.
pub fn encrypt_with_label(
    message: &BigUnsignedInteger,
    public_key: &RsaPublicKey,
    label: &[u8],
) -> Result<BigUnsignedInteger> {
    encrypt_with_rng(message, public_key, true, label, &mut local_rng())
}

/// Encrypt with a caller-supplied generator for the OAEP seed.
/// `label` is ignored in raw mode.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    message: &BigUnsignedInteger,
    public_key: &RsaPublicKey,
    use_oaep: bool,
    label: &[u8],
    rng: &mut R,
) -> Result<BigUnsignedInteger> {
    if use_oaep {
        encrypt_oaep(message, public_key, OaepHash::default(), label, rng)
    } else {
        encrypt_raw(message, public_key)
    }
}

/// OAEP encryption with an explicit hash; decryption must use the same one.
pub fn encrypt_oaep<R: RngCore + CryptoRng>(
    message: &BigUnsignedInteger,
    public_key: &RsaPublicKey,
    hash: OaepHash,
    label: &[u8],
    rng: &mut R,
) -> Result<BigUnsignedInteger> {
    encrypt_padded(&message.to_bytes_be(), public_key, hash, label, rng)
}

/// Encrypt bytes. With OAEP the bytes are padded as-is; in raw mode they
/// are read as a big-endian integer, so leading zero bytes are not kept.
pub fn encrypt_bytes(
    plaintext: &[u8],
    public_key: &RsaPublicKey,
    use_oaep: bool,
) -> Result<BigUnsignedInteger> {
    if use_oaep {
        encrypt_padded(plaintext, public_key, OaepHash::default(), &[], &mut local_rng())
    } else {
        encrypt_raw(&BigUnsignedInteger::from_bytes_be(plaintext), public_key)
    }
}

fn encrypt_raw(
    message: &BigUnsignedInteger,
    public_key: &RsaPublicKey,
) -> Result<BigUnsignedInteger> {
    if message >= public_key.n() {
        return Err(ValidationError::MessageTooLarge.into());
    }
    mod_exp(message, public_key.e(), public_key.n())
}

fn encrypt_padded<R: RngCore + CryptoRng>(
    message: &[u8],
    public_key: &RsaPublicKey,
    hash: OaepHash,
    label: &[u8],
    rng: &mut R,
) -> Result<BigUnsignedInteger> {
    let k = public_key.byte_length();
    let encoded = oaep::encode(message, label, k, hash, rng)?;
    debug!(modulus_bytes = k, ?hash, "OAEP encoded");
    // Leading zero byte keeps the encoded value below n
    let m = BigUnsignedInteger::from_bytes_be(&encoded);
    mod_exp(&m, public_key.e(), public_key.n())
}
