//! Key material and configuration at the crate boundary.

use anyhow::Result;
use cryptoran_core::key_material::{AES_KEY, DEC_EXPONENT, ENC_EXPONENT, MODULUS};
use cryptoran_core::{
    rsa, BigUnsignedInteger, BlockCipherConfig, BlockCipherKind, DhKeyPair, DhParameters, Error,
    ErrorCategory, KeyMaterial, Mode, OaepHash, RsaConfig, RsaPrivateKey, RsaPublicKey,
    SignatureConfig, SymmetricKey,
};

#[test]
fn rsa_keys_survive_the_mapping() -> Result<()> {
    let keypair = rsa::generate_keypair(512)?;
    let material = keypair.to_key_material();
    let names: Vec<&str> = material.field_names().collect();
    assert_eq!(names, vec![DEC_EXPONENT, ENC_EXPONENT, MODULUS]);

    let public = RsaPublicKey::from_key_material(&material)?;
    let private = RsaPrivateKey::from_key_material(&material)?;
    let m = BigUnsignedInteger::from_u64(1234);
    for use_oaep in [false, true] {
        let c = rsa::encrypt(&m, &public, use_oaep)?;
        assert_eq!(rsa::decrypt(&c, &private, use_oaep)?, m);
        assert_eq!(rsa::decrypt(&c, &keypair.private_key, use_oaep)?, m);
    }
    Ok(())
}

#[test]
fn missing_fields_are_never_defaulted() {
    let err = RsaPublicKey::from_key_material(&KeyMaterial::new()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.to_string().contains(ENC_EXPONENT));

    let err = SymmetricKey::from_key_material(&KeyMaterial::new(), BlockCipherKind::Aes, 128)
        .unwrap_err();
    assert!(err.to_string().contains(AES_KEY));
}

#[test]
fn all_zero_symmetric_key_is_a_key() -> Result<()> {
    let material = KeyMaterial::new().with(AES_KEY, BigUnsignedInteger::zero());
    let key = SymmetricKey::from_key_material(&material, BlockCipherKind::Aes, 256)?;
    assert_eq!(key.key(), &[0u8; 32]);
    assert!(key.iv().is_none());
    Ok(())
}

#[test]
fn dh_material_rebuilds_the_pair() -> Result<()> {
    let params = DhParameters::modp_2048();
    let pair = cryptoran_core::dh::generate_key_pair(&params)?;

    let mut material = params.to_key_material();
    material.extend(pair.to_key_material());

    let params_back = DhParameters::from_key_material(&material)?;
    let pair_back = DhKeyPair::from_key_material(&material, &params_back)?;
    assert_eq!(pair_back.public(), pair.public());
    Ok(())
}

#[test]
fn key_material_serializes_as_hex() -> Result<()> {
    let material = KeyMaterial::new()
        .with(MODULUS, BigUnsignedInteger::from_u64(3233))
        .with(ENC_EXPONENT, BigUnsignedInteger::from_u64(17));
    let json = serde_json::to_string(&material)?;
    assert_eq!(json, r#"{"fields":{"ENC_EXPONENT":"11","MODULUS":"ca1"}}"#);

    let back: KeyMaterial = serde_json::from_str(&json)?;
    assert_eq!(back, material);
    Ok(())
}

#[test]
fn configs_load_from_json() -> Result<()> {
    let block: BlockCipherConfig =
        serde_json::from_str(r#"{"cipher":"des","mode":"ecb","parallel":false}"#)?;
    assert_eq!(
        block,
        BlockCipherConfig::new(BlockCipherKind::Des, Mode::Ecb).with_parallel(false)
    );

    // Missing fields fall back to defaults
    let rsa: RsaConfig = serde_json::from_str(r#"{"bit_length":1024,"use_oaep":false}"#)?;
    assert_eq!(rsa.bit_length, 1024);
    assert!(!rsa.use_oaep);
    assert_eq!(rsa.public_exponent, 65537);
    assert_eq!(rsa.oaep_hash, OaepHash::Sha1);

    let rsa: RsaConfig = serde_json::from_str(r#"{"oaep_hash":"sha256"}"#)?;
    assert_eq!(rsa.oaep_hash, OaepHash::Sha256);

    let sig = SignatureConfig::default().with_bit_length(2048);
    let json = serde_json::to_string(&sig)?;
    assert_eq!(serde_json::from_str::<SignatureConfig>(&json)?, sig);
    Ok(())
}

#[test]
fn error_categories() {
    let err: Error = "elgamal".parse::<cryptoran_core::Primitive>().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(err.category().to_string(), "validation");
}
