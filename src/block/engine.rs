// Block Cipher Engine
// Padding plus ECB/CBC chaining over a scheduled AES or DES cipher

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use super::padding::{pad, unpad};
use super::{BlockCipher, BlockCipherKind, CipherStream, Mode, SymmetricKey};
use crate::config::BlockCipherConfig;
use crate::error::{CryptoOperationError, Error, Result};

/// Symmetric encryption session bound to one cipher and mode.
#[derive(Clone, Debug, Default)]
pub struct BlockCipherEngine {
    config: BlockCipherConfig,
}

impl BlockCipherEngine {
    pub fn new(config: BlockCipherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BlockCipherConfig {
        &self.config
    }

    /// Random key (and IV for CBC) sized for this engine's cipher.
    pub fn generate_key(&self, key_bits: usize) -> Result<SymmetricKey> {
        SymmetricKey::generate(self.config.cipher, key_bits, self.config.mode)
    }

    /// Pad and encrypt `plaintext`. Empty input yields one block of padding.
    pub fn encrypt(&self, plaintext: &[u8], key: &SymmetricKey) -> Result<CipherStream> {
        let BlockCipherConfig {
            cipher: kind,
            mode,
            parallel,
        } = self.config;
        let cipher = kind.schedule(key.key())?;
        let block_size = cipher.block_size();
        let iv = key.iv_for(mode, block_size)?;

        let mut data = pad(plaintext, block_size);
        match iv {
            Some(iv) => cbc_encrypt(&cipher, iv, &mut data),
            None => for_each_block(&mut data, block_size, parallel, |block| {
                cipher.encrypt_block(block)
            }),
        }

        debug!(
            cipher = %kind,
            mode = %mode,
            blocks = data.len() / block_size,
            "encrypted"
        );
        CipherStream::from_bytes(block_size, &data)
    }

    /// Decrypt `stream` and strip its padding.
    pub fn decrypt(&self, stream: &CipherStream, key: &SymmetricKey) -> Result<Vec<u8>> {
        let BlockCipherConfig {
            cipher: kind,
            mode,
            parallel,
        } = self.config;
        let cipher = kind.schedule(key.key())?;
        let block_size = cipher.block_size();
        let iv = key.iv_for(mode, block_size)?;

        if stream.block_size() != block_size {
            return Err(Error::invalid_parameter(format!(
                "stream uses {}-byte blocks, {} needs {}",
                stream.block_size(),
                kind,
                block_size
            )));
        }
        if stream.is_empty() {
            return Err(CryptoOperationError::InvalidPadding.into());
        }

        let mut data = stream.to_bytes()?;
        match iv {
            Some(iv) => cbc_decrypt(&cipher, iv, &mut data, parallel),
            None => for_each_block(&mut data, block_size, parallel, |block| {
                cipher.decrypt_block(block)
            }),
        }

        debug!(cipher = %kind, mode = %mode, blocks = stream.len(), "decrypted");
        unpad(&data, block_size)
    }
}

/// One-shot encryption with an explicit cipher and mode.
pub fn encrypt(
    plaintext: &[u8],
    key: &SymmetricKey,
    kind: BlockCipherKind,
    mode: Mode,
) -> Result<CipherStream> {
    BlockCipherEngine::new(BlockCipherConfig::new(kind, mode)).encrypt(plaintext, key)
}

/// One-shot decryption with an explicit cipher and mode.
pub fn decrypt(
    stream: &CipherStream,
    key: &SymmetricKey,
    kind: BlockCipherKind,
    mode: Mode,
) -> Result<Vec<u8>> {
    BlockCipherEngine::new(BlockCipherConfig::new(kind, mode)).decrypt(stream, key)
}

/// Apply `op` to every block of `data`. Blocks are independent, so the
/// parallel path gives the same output as the sequential one.
#[cfg(feature = "parallel")]
fn for_each_block<F>(data: &mut [u8], block_size: usize, parallel: bool, op: F)
where
    F: Fn(&mut [u8]) + Send + Sync,
{
    if parallel {
        data.par_chunks_mut(block_size).for_each(op);
    } else {
        data.chunks_mut(block_size).for_each(op);
    }
}

#[cfg(not(feature = "parallel"))]
fn for_each_block<F>(data: &mut [u8], block_size: usize, _parallel: bool, op: F)
where
    F: Fn(&mut [u8]) + Send + Sync,
{
    data.chunks_mut(block_size).for_each(op);
}

fn xor_in_place(block: &mut [u8], mask: &[u8]) {
    for (b, m) in block.iter_mut().zip(mask) {
        *b ^= m;
    }
}

// Sequential: each block depends on the previous ciphertext.
fn cbc_encrypt<C: BlockCipher>(cipher: &C, iv: &[u8], data: &mut [u8]) {
    let block_size = cipher.block_size();
    let mut previous = iv.to_vec();
    for block in data.chunks_mut(block_size) {
        xor_in_place(block, &previous);
        cipher.encrypt_block(block);
        previous.copy_from_slice(block);
    }
}

fn cbc_decrypt<C: BlockCipher>(cipher: &C, iv: &[u8], data: &mut [u8], parallel: bool) {
    let block_size = cipher.block_size();
    // Chaining values: IV followed by every ciphertext block but the last
    let mut chain = Vec::with_capacity(data.len());
    chain.extend_from_slice(iv);
    chain.extend_from_slice(&data[..data.len() - block_size]);

    for_each_block(data, block_size, parallel, |block| cipher.decrypt_block(block));
    for (block, previous) in data
        .chunks_mut(block_size)
        .zip(chain.chunks(block_size))
    {
        xor_in_place(block, previous);
    }
}
