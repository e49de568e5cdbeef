//! AES-GCM sealing and opening.
//!
//! The AES variant follows the key length: 16 bytes selects AES-128-GCM,
//! 24 bytes AES-192-GCM and 32 bytes AES-256-GCM. All variants use a
//! 96-bit nonce, a 128-bit tag and no associated data.

use crate::error::{CryptoError, CryptoResult};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, AeadCore, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use rand::RngCore;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Size of the AES-GCM nonce in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// Returns a fresh random 12-byte nonce.
pub fn generate_iv() -> [u8; NONCE_SIZE] {
    let mut iv = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut iv);
    iv
}

/// Encrypts `plaintext`, returning ciphertext with the tag appended.
pub fn seal(key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    check_nonce(iv)?;
    match key.len() {
        16 => seal_with::<Aes128Gcm>(key, iv, plaintext),
        24 => seal_with::<Aes192Gcm>(key, iv, plaintext),
        32 => seal_with::<Aes256Gcm>(key, iv, plaintext),
        n => Err(CryptoError::UnsupportedKeyLength(n)),
    }
}

/// Decrypts and authenticates `ciphertext` (tag appended).
///
/// Any tag mismatch is an error; no partial plaintext is ever returned.
pub fn open(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    check_nonce(iv)?;
    match key.len() {
        16 => open_with::<Aes128Gcm>(key, iv, ciphertext),
        24 => open_with::<Aes192Gcm>(key, iv, ciphertext),
        32 => open_with::<Aes256Gcm>(key, iv, ciphertext),
        n => Err(CryptoError::UnsupportedKeyLength(n)),
    }
}

fn check_nonce(iv: &[u8]) -> CryptoResult<()> {
    if iv.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_SIZE,
            actual: iv.len(),
        });
    }
    Ok(())
}

fn seal_with<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| CryptoError::Encryption(format!("failed to create cipher: {e}")))?;
    cipher
        .encrypt(aes_gcm::aead::Nonce::<C>::from_slice(iv), plaintext)
        .map_err(|e| CryptoError::Encryption(format!("AES-GCM seal failed: {e}")))
}

fn open_with<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| CryptoError::Decryption(format!("failed to create cipher: {e}")))?;
    cipher
        .decrypt(aes_gcm::aead::Nonce::<C>::from_slice(iv), ciphertext)
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })
}
