//! Key material wrappers.

use crate::error::{CryptoError, CryptoResult};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a content data key (AES-256).
pub const DATA_KEY_SIZE: usize = 32;

/// Master key lengths accepted for AES-128, AES-192 and AES-256.
pub const MASTER_KEY_SIZES: [usize; 3] = [16, 24, 32];

/// A 256-bit data key used directly on content.
///
/// Zeroized on drop; `Debug` never prints the key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey {
    bytes: [u8; DATA_KEY_SIZE],
}

impl DataKey {
    pub fn from_bytes(bytes: [u8; DATA_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Copies a data key out of a slice, which must be exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; DATA_KEY_SIZE] =
            slice.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: DATA_KEY_SIZE,
                actual: slice.len(),
            })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; DATA_KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataKey([REDACTED])")
    }
}

/// Long-lived key that wraps data keys when no remote service is used.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Accepts 16, 24 or 32 bytes of key material.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if !MASTER_KEY_SIZES.contains(&bytes.len()) {
            return Err(CryptoError::UnsupportedKeyLength(bytes.len()));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey({} bytes, [REDACTED])", self.bytes.len())
    }
}
