// OAEP Padding
// EME-OAEP (RFC 8017) with MGF1 over SHA-1 or SHA-256

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{CryptoOperationError, Result, ValidationError};

/// Hash behind the label digest and MGF1.
///
/// SHA-1 is the RFC 8017 default and leaves 22 bytes of message room in a
/// 512-bit modulus; SHA-256 needs at least a 528-bit modulus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OaepHash {
    #[default]
    Sha1,
    Sha256,
}

impl OaepHash {
    /// Digest length in bytes
    pub fn output_len(self) -> usize {
        match self {
            OaepHash::Sha1 => 20,
            OaepHash::Sha256 => 32,
        }
    }

    /// Smallest modulus, in bytes, that can hold an empty message
    pub fn min_modulus_len(self) -> usize {
        2 * self.output_len() + 2
    }

    fn digest(self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            OaepHash::Sha1 => digest_parts::<Sha1>(parts),
            OaepHash::Sha256 => digest_parts::<Sha256>(parts),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(*part);
    }
    hasher.finalize().to_vec()
}

/// Largest message that fits a `k`-byte modulus: `k - 2*hLen - 2`.
pub fn max_message_len(k: usize, hash: OaepHash) -> usize {
    k.saturating_sub(hash.min_modulus_len())
}

/// MGF1 mask of `len` bytes: Hash(seed || counter) for counter = 0, 1, ...
pub fn mgf1(hash: OaepHash, seed: &[u8], len: usize) -> Vec<u8> {
    let mut mask = Vec::with_capacity(len + hash.output_len());
    let mut counter: u32 = 0;
    while mask.len() < len {
        mask.extend_from_slice(&hash.digest(&[seed, &counter.to_be_bytes()[..]]));
        counter += 1;
    }
    mask.truncate(len);
    mask
}

fn xor_mask(data: &mut [u8], mask: &[u8]) {
    for (d, m) in data.iter_mut().zip(mask) {
        *d ^= m;
    }
}

/// Encode `message` into a `k`-byte block `0x00 || maskedSeed || maskedDB`.
pub fn encode<R: RngCore + CryptoRng>(
    message: &[u8],
    label: &[u8],
    k: usize,
    hash: OaepHash,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let h_len = hash.output_len();
    if k < hash.min_modulus_len() || message.len() > max_message_len(k, hash) {
        return Err(ValidationError::MessageTooLarge.into());
    }

    // DB = lHash || PS || 0x01 || M
    let db_len = k - h_len - 1;
    let mut db = Vec::with_capacity(db_len);
    db.extend_from_slice(&hash.digest(&[label]));
    db.resize(db_len - message.len() - 1, 0);
    db.push(0x01);
    db.extend_from_slice(message);

    let mut seed = Zeroizing::new(vec![0u8; h_len]);
    rng.fill_bytes(&mut seed);

    let db_mask = mgf1(hash, &seed, db_len);
    xor_mask(&mut db, &db_mask);
    let mut masked_seed = Zeroizing::new(seed.to_vec());
    let seed_mask = mgf1(hash, &db, h_len);
    xor_mask(&mut masked_seed, &seed_mask);

    let mut em = Vec::with_capacity(k);
    em.push(0x00);
    em.extend_from_slice(&masked_seed);
    em.extend_from_slice(&db);
    Ok(em)
}

/// Reverse [`encode`]. `em` must be exactly `k` bytes.
pub fn decode(em: &[u8], label: &[u8], k: usize, hash: OaepHash) -> Result<Vec<u8>> {
    let h_len = hash.output_len();
    if k < hash.min_modulus_len() || em.len() != k {
        return Err(
            CryptoOperationError::OaepDecoding("encoded block has the wrong length").into(),
        );
    }
    if em[0] != 0x00 {
        return Err(CryptoOperationError::OaepDecoding("non-zero leading byte").into());
    }

    let (masked_seed, masked_db) = em[1..].split_at(h_len);
    let mut seed = Zeroizing::new(masked_seed.to_vec());
    let seed_mask = mgf1(hash, masked_db, h_len);
    xor_mask(&mut seed, &seed_mask);

    let mut db = masked_db.to_vec();
    let db_mask = mgf1(hash, &seed, db.len());
    xor_mask(&mut db, &db_mask);

    let (l_hash, rest) = db.split_at(h_len);
    if l_hash != hash.digest(&[label]).as_slice() {
        return Err(CryptoOperationError::OaepDecoding("label hash mismatch").into());
    }

    match rest.iter().position(|&b| b != 0) {
        Some(i) if rest[i] == 0x01 => Ok(rest[i + 1..].to_vec()),
        _ => Err(
            CryptoOperationError::OaepDecoding("padding string not terminated by 0x01").into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::math::prime::local_rng;

    const HASHES: [OaepHash; 2] = [OaepHash::Sha1, OaepHash::Sha256];

    #[test]
    fn test_mgf1_prefix_property() {
        for hash in HASHES {
            let long = mgf1(hash, b"seed", 100);
            let short = mgf1(hash, b"seed", 20);
            assert_eq!(long.len(), 100);
            assert_eq!(&long[..20], short.as_slice());
        }
        assert_eq!(
            &mgf1(OaepHash::Sha256, b"seed", 32)[..],
            Sha256::digest(b"seed\x00\x00\x00\x00").as_slice()
        );
        assert_eq!(
            &mgf1(OaepHash::Sha1, b"seed", 20)[..],
            Sha1::digest(b"seed\x00\x00\x00\x00").as_slice()
        );
    }

    #[test]
    fn test_encode_decode() {
        let k = 128;
        for hash in HASHES {
            let em = encode(b"hello", b"", k, hash, &mut local_rng()).unwrap();
            assert_eq!(em.len(), k);
            assert_eq!(em[0], 0);
            assert_eq!(decode(&em, b"", k, hash).unwrap(), b"hello");
        }
    }

    #[test]
    fn test_hashes_do_not_mix() {
        let em = encode(b"hello", b"", 128, OaepHash::Sha1, &mut local_rng()).unwrap();
        assert!(decode(&em, b"", 128, OaepHash::Sha256).is_err());
    }

    #[test]
    fn test_encoding_is_randomized() {
        let a = encode(b"same", b"", 128, OaepHash::Sha256, &mut local_rng()).unwrap();
        let b = encode(b"same", b"", 128, OaepHash::Sha256, &mut local_rng()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_capacity() {
        let k = 96;
        assert_eq!(max_message_len(k, OaepHash::Sha256), 30);
        assert!(encode(&[7u8; 30], b"", k, OaepHash::Sha256, &mut local_rng()).is_ok());
        assert_eq!(
            encode(&[7u8; 31], b"", k, OaepHash::Sha256, &mut local_rng()).unwrap_err(),
            Error::Validation(ValidationError::MessageTooLarge)
        );

        // A 512-bit modulus only fits OAEP under SHA-1
        assert_eq!(max_message_len(64, OaepHash::Sha1), 22);
        assert!(encode(&[7u8; 22], b"", 64, OaepHash::Sha1, &mut local_rng()).is_ok());
        assert!(encode(b"", b"", 64, OaepHash::Sha256, &mut local_rng()).is_err());
    }

    #[test]
    fn test_label_mismatch() {
        let em = encode(b"secret", b"alpha", 128, OaepHash::Sha1, &mut local_rng()).unwrap();
        assert_eq!(
            decode(&em, b"beta", 128, OaepHash::Sha1).unwrap_err(),
            Error::CryptoOperation(CryptoOperationError::OaepDecoding("label hash mismatch"))
        );
    }

    #[test]
    fn test_nonzero_leading_byte() {
        let mut em = encode(b"secret", b"", 128, OaepHash::Sha1, &mut local_rng()).unwrap();
        em[0] = 1;
        assert!(matches!(
            decode(&em, b"", 128, OaepHash::Sha1).unwrap_err(),
            Error::CryptoOperation(CryptoOperationError::OaepDecoding(_))
        ));
    }
}
