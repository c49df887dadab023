use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use cryptoran_core::block::{decrypt, encrypt};
use cryptoran_core::math::mod_exp;
use cryptoran_core::{
    rsa, BigUnsignedInteger, BlockCipherConfig, BlockCipherEngine, BlockCipherKind, DhParameters,
    Mode, SymmetricKey,
};

fn bench_block_ciphers(c: &mut Criterion) {
    let data = vec![0xA5u8; 64 * 1024];
    for (kind, bits) in [(BlockCipherKind::Aes, 128), (BlockCipherKind::Des, 64)] {
        for mode in [Mode::Ecb, Mode::Cbc] {
            let key = SymmetricKey::generate(kind, bits, mode).unwrap();
            let stream = encrypt(&data, &key, kind, mode).unwrap();

            c.bench_function(&format!("{}_{}_encrypt_64k", kind, mode), |b| {
                b.iter(|| encrypt(black_box(&data), &key, kind, mode).unwrap());
            });
            c.bench_function(&format!("{}_{}_decrypt_64k", kind, mode), |b| {
                b.iter(|| decrypt(black_box(&stream), &key, kind, mode).unwrap());
            });
        }
    }
}

fn bench_parallel_ecb(c: &mut Criterion) {
    let data = vec![0x5Au8; 1024 * 1024];
    let key = SymmetricKey::generate(BlockCipherKind::Aes, 128, Mode::Ecb).unwrap();
    let config = BlockCipherConfig::new(BlockCipherKind::Aes, Mode::Ecb);
    let sequential = BlockCipherEngine::new(config.clone().with_parallel(false));
    let parallel = BlockCipherEngine::new(config.with_parallel(true));

    c.bench_function("aes_ecb_encrypt_1m_sequential", |b| {
        b.iter(|| sequential.encrypt(black_box(&data), &key).unwrap());
    });
    c.bench_function("aes_ecb_encrypt_1m_parallel", |b| {
        b.iter(|| parallel.encrypt(black_box(&data), &key).unwrap());
    });
}

fn bench_mod_exp(c: &mut Criterion) {
    let params = DhParameters::modp_2048();
    let exponent = BigUnsignedInteger::from_bytes_be(&[0xC3; 256]);
    c.bench_function("mod_exp_2048", |b| {
        b.iter(|| mod_exp(black_box(params.g()), &exponent, params.p()).unwrap());
    });
}

fn bench_rsa(c: &mut Criterion) {
    let keypair = rsa::generate_keypair(2048).unwrap();
    let m = BigUnsignedInteger::from_text("benchmark message");
    let ciphertext = rsa::encrypt(&m, &keypair.public_key, true).unwrap();

    c.bench_function("rsa_2048_oaep_encrypt", |b| {
        b.iter(|| rsa::encrypt(black_box(&m), &keypair.public_key, true).unwrap());
    });
    c.bench_function("rsa_2048_oaep_decrypt_crt", |b| {
        b.iter(|| rsa::decrypt(black_box(&ciphertext), &keypair.private_key, true).unwrap());
    });
}

criterion_group!(
    benches,
    bench_block_ciphers,
    bench_parallel_ecb,
    bench_mod_exp,
    bench_rsa
);
criterion_main!(benches);
