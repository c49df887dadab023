// Blocks and cipher streams
// Fixed-width block values in the order they were produced

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationError};
use crate::math::BigUnsignedInteger;

/// Widest block any supported cipher uses, in bytes
pub const MAX_BLOCK_SIZE: usize = 16;

/// One cipher block as an unsigned integer (up to 128 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Block(u128);

impl Block {
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    /// Big-endian bytes, at most 16 of them.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_BLOCK_SIZE {
            return Err(ValidationError::BlockOutOfRange.into());
        }
        let mut buf = [0u8; MAX_BLOCK_SIZE];
        buf[MAX_BLOCK_SIZE - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(u128::from_be_bytes(buf)))
    }

    /// Big-endian bytes, exactly `block_size` long. Fails if the value is wider.
    pub fn to_bytes(&self, block_size: usize) -> Result<Vec<u8>> {
        if block_size > MAX_BLOCK_SIZE {
            return Err(ValidationError::BlockOutOfRange.into());
        }
        let bytes = self.0.to_be_bytes();
        let (high, low) = bytes.split_at(MAX_BLOCK_SIZE - block_size);
        if high.iter().any(|&b| b != 0) {
            return Err(ValidationError::BlockOutOfRange.into());
        }
        Ok(low.to_vec())
    }

    pub fn from_integer(value: &BigUnsignedInteger) -> Result<Self> {
        if value.bits() > 128 {
            return Err(ValidationError::BlockOutOfRange.into());
        }
        Self::from_bytes(&value.to_bytes_be())
    }

    pub fn to_integer(&self) -> BigUnsignedInteger {
        BigUnsignedInteger::from_bytes_be(&self.0.to_be_bytes())
    }
}

impl From<u128> for Block {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for Block {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl From<Block> for BigUnsignedInteger {
    fn from(block: Block) -> Self {
        block.to_integer()
    }
}

/// Ordered sequence of blocks produced by one encryption.
///
/// Order is significant: CBC chaining and plaintext reconstruction both
/// depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherStream {
    block_size: usize,
    blocks: Vec<Block>,
}

impl CipherStream {
    pub fn new(block_size: usize, blocks: Vec<Block>) -> Self {
        Self { block_size, blocks }
    }

    /// Split block-aligned bytes into blocks.
    pub fn from_bytes(block_size: usize, bytes: &[u8]) -> Result<Self> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(Error::invalid_parameter("unsupported block size"));
        }
        if bytes.len() % block_size != 0 {
            return Err(Error::invalid_parameter(
                "stream length is not a multiple of the block size",
            ));
        }
        let blocks = bytes
            .chunks_exact(block_size)
            .map(Block::from_bytes)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { block_size, blocks })
    }

    /// Rebuild a stream from integers, e.g. parsed from a persisted form.
    pub fn from_integers(block_size: usize, values: &[BigUnsignedInteger]) -> Result<Self> {
        let blocks = values
            .iter()
            .map(Block::from_integer)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { block_size, blocks })
    }

    /// Concatenated block bytes. Fails if any block is wider than the block size.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.blocks.len() * self.block_size);
        for block in &self.blocks {
            out.extend_from_slice(&block.to_bytes(self.block_size)?);
        }
        Ok(out)
    }

    pub fn to_integers(&self) -> Vec<BigUnsignedInteger> {
        self.blocks.iter().map(Block::to_integer).collect()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_bytes() {
        let block = Block::from_bytes(&[0x01, 0x02]).unwrap();
        assert_eq!(block.value(), 0x0102);
        assert_eq!(block.to_bytes(8).unwrap(), vec![0, 0, 0, 0, 0, 0, 1, 2]);
        assert!(Block::from_bytes(&[0u8; 17]).is_err());
    }

    #[test]
    fn test_block_too_wide_for_des() {
        let block = Block::new(1u128 << 64);
        assert_eq!(
            block.to_bytes(8).unwrap_err(),
            Error::Validation(ValidationError::BlockOutOfRange)
        );
        assert_eq!(block.to_bytes(16).unwrap().len(), 16);
    }

    #[test]
    fn test_stream_from_bytes() {
        let stream = CipherStream::from_bytes(8, &[7u8; 24]).unwrap();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.to_bytes().unwrap(), vec![7u8; 24]);
        assert!(CipherStream::from_bytes(8, &[7u8; 20]).is_err());
    }

    #[test]
    fn test_stream_integers() {
        let stream = CipherStream::new(16, vec![Block::new(5), Block::new(u128::MAX)]);
        let values = stream.to_integers();
        assert_eq!(values[0], BigUnsignedInteger::from_u64(5));
        assert_eq!(values[1].bits(), 128);
        assert_eq!(CipherStream::from_integers(16, &values).unwrap(), stream);
    }
}
