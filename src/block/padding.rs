// Block padding
// Pad byte value equals the pad length; aligned input gets a full extra block

use crate::error::{CryptoOperationError, Result};

/// Pad `data` to a multiple of `block_size` (1..=255).
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Strip padding added by [`pad`].
///
/// Fails with `InvalidPadding` when the length is not block aligned, the last
/// byte is outside `[1, block_size]`, or the pad bytes disagree with it.
pub fn unpad(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if data.is_empty() || data.len() % block_size != 0 {
        return Err(CryptoOperationError::InvalidPadding.into());
    }

    let pad_len = match data.last() {
        Some(&last) => usize::from(last),
        None => return Err(CryptoOperationError::InvalidPadding.into()),
    };
    if pad_len == 0 || pad_len > block_size {
        return Err(CryptoOperationError::InvalidPadding.into());
    }

    let (body, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| usize::from(b) != pad_len) {
        return Err(CryptoOperationError::InvalidPadding.into());
    }

    Ok(body.to_vec())
}
