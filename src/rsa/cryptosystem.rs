// RSA Cryptosystem
// Session type carrying the OAEP setting and label between calls

use tracing::info;

use super::decrypt::{decrypt, decrypt_oaep};
use super::encrypt::{encrypt_oaep, encrypt_with_rng};
use super::keygen::{generate_keypair_with, RsaKeyPair, RsaPrivateKey, RsaPublicKey};
use crate::config::RsaConfig;
use crate::error::Result;
use crate::math::prime::local_rng;
use crate::math::{BigUnsignedInteger, PrimeSearch};

/// RSA operations under one configuration. Holds no key material.
#[derive(Clone, Debug, Default)]
pub struct RsaCryptosystem {
    config: RsaConfig,
}

impl RsaCryptosystem {
    pub fn new(config: RsaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RsaConfig {
        &self.config
    }

    /// Key pair sized by the configured bit length.
    pub fn generate_keypair(&self) -> Result<RsaKeyPair> {
        self.generate_keypair_bounded(&PrimeSearch::default())
    }

    /// Key generation that gives up when `search` is cancelled or expires.
    pub fn generate_keypair_bounded(&self, search: &PrimeSearch) -> Result<RsaKeyPair> {
        let keypair = generate_keypair_with(&self.config, &mut local_rng(), search)?;
        info!(
            bit_length = keypair.bit_length(),
            oaep = self.config.use_oaep,
            "RSA session keys ready"
        );
        Ok(keypair)
    }

    pub fn encrypt(
        &self,
        message: &BigUnsignedInteger,
        public_key: &RsaPublicKey,
    ) -> Result<BigUnsignedInteger> {
        if self.config.use_oaep {
            encrypt_oaep(
                message,
                public_key,
                self.config.oaep_hash,
                &self.config.oaep_label,
                &mut local_rng(),
            )
        } else {
            encrypt_with_rng(message, public_key, false, &[], &mut local_rng())
        }
    }

    pub fn decrypt(
        &self,
        ciphertext: &BigUnsignedInteger,
        private_key: &RsaPrivateKey,
    ) -> Result<BigUnsignedInteger> {
        if self.config.use_oaep {
            decrypt_oaep(
                ciphertext,
                private_key,
                self.config.oaep_hash,
                &self.config.oaep_label,
            )
        } else {
            decrypt(ciphertext, private_key, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::OaepHash;

    #[test]
    fn test_session_roundtrip_both_modes() {
        for use_oaep in [false, true] {
            let rsa = RsaCryptosystem::new(
                RsaConfig::default()
                    .with_bit_length(768)
                    .with_oaep(use_oaep)
                    .with_oaep_label(b"session".to_vec()),
            );
            let keypair = rsa.generate_keypair().unwrap();
            assert_eq!(keypair.public_key.bit_length(), 768);

            let m = BigUnsignedInteger::from_text("Hello, RSA!");
            let c = rsa.encrypt(&m, &keypair.public_key).unwrap();
            assert_eq!(rsa.decrypt(&c, &keypair.private_key).unwrap(), m);
        }
    }

    #[test]
    fn test_session_label_is_bound() {
        let sender = RsaCryptosystem::new(
            RsaConfig::default()
                .with_bit_length(768)
                .with_oaep_label(b"one".to_vec()),
        );
        let receiver = RsaCryptosystem::new(
            RsaConfig::default()
                .with_bit_length(768)
                .with_oaep_label(b"two".to_vec()),
        );
        let keypair = sender.generate_keypair().unwrap();
        let c = sender
            .encrypt(&BigUnsignedInteger::from_u64(5), &keypair.public_key)
            .unwrap();
        assert!(receiver.decrypt(&c, &keypair.private_key).is_err());
    }

    #[test]
    fn test_session_hash_choice() {
        // SHA-1 fits a 512-bit modulus; SHA-256 does not
        let sha1 = RsaCryptosystem::new(RsaConfig::default().with_bit_length(512));
        let keypair = sha1.generate_keypair().unwrap();
        let m = BigUnsignedInteger::from_text("Hello, RSA!");
        let c = sha1.encrypt(&m, &keypair.public_key).unwrap();
        assert_eq!(sha1.decrypt(&c, &keypair.private_key).unwrap(), m);

        let sha256 = RsaCryptosystem::new(
            RsaConfig::default()
                .with_bit_length(512)
                .with_oaep_hash(OaepHash::Sha256),
        );
        assert!(sha256.encrypt(&m, &keypair.public_key).is_err());
        assert!(sha256.decrypt(&c, &keypair.private_key).is_err());
    }
}
