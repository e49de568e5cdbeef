//! HKDF-SHA256 key derivation.

use crate::error::{CryptoError, CryptoResult};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Salt size, matching the SHA-256 output length.
pub const SALT_SIZE: usize = 32;

/// Longest output HKDF-SHA256 can expand to (255 hash blocks).
pub const MAX_DERIVED_LEN: usize = 255 * 32;

/// Returns a fresh random salt.
pub fn random_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Derives `len` bytes of key material from `ikm` using HKDF-SHA256.
///
/// # Arguments
/// * `ikm` - Input keying material (the master key)
/// * `salt` - Per-derivation salt
/// * `info` - Context info, may be empty
pub fn derive_key(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    len: usize,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = Zeroizing::new(vec![0u8; len]);
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::KeyDerivation(format!("HKDF expand failed: {e}")))?;
    Ok(okm)
}
