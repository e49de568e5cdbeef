//! Offline key service backed by a locally configured master key.
//!
//! Data keys are derived with HKDF-SHA256 from the master key and a fresh
//! random salt, then wrapped with AES-GCM under the same master key, so the
//! output has the same shape as the remote service's.

use crate::error::{KmsError, KmsResult};
use crate::service::KeyService;
use crate::types::{EncryptedBlob, GeneratedDataKey};
use async_trait::async_trait;
use kmsenv_crypto::{MasterKey, derive_key, generate_iv, open, random_salt, seal};
use zeroize::Zeroizing;

/// Key service for development environments without KMS access.
///
/// The `key_id` argument is echoed back but never selects a key: every
/// operation uses the single configured master key.
#[derive(Debug)]
pub struct LocalDevKeyService {
    master_key: MasterKey,
}

impl LocalDevKeyService {
    /// Fails with [`KmsError::Config`] unless the key is 16, 24 or 32 bytes.
    pub fn new(master_key: &[u8]) -> KmsResult<Self> {
        let master_key = MasterKey::from_bytes(master_key).map_err(|_| {
            KmsError::Config(format!(
                "dev master key must be 16, 24 or 32 bytes, got {}",
                master_key.len()
            ))
        })?;
        Ok(Self { master_key })
    }

    fn wrap(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptedBlob> {
        let iv = generate_iv();
        let ciphertext_blob = seal(self.master_key.as_bytes(), &iv, plaintext)?;
        Ok(EncryptedBlob {
            key_id: key_id.to_string(),
            ciphertext_blob,
            iv: iv.to_vec(),
        })
    }
}

#[async_trait]
impl KeyService for LocalDevKeyService {
    fn name(&self) -> &'static str {
        "local-dev"
    }

    async fn generate_data_key(
        &self,
        key_id: &str,
        number_of_bytes: usize,
    ) -> KmsResult<GeneratedDataKey> {
        let salt = random_salt();
        let plaintext = derive_key(self.master_key.as_bytes(), &salt, &[], number_of_bytes)?;
        let wrapped = self.wrap(key_id, &plaintext)?;

        Ok(GeneratedDataKey {
            key_id: wrapped.key_id,
            plaintext,
            ciphertext_blob: wrapped.ciphertext_blob,
            iv: wrapped.iv,
        })
    }

    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptedBlob> {
        self.wrap(key_id, plaintext)
    }

    async fn decrypt(
        &self,
        _key_id: &str,
        ciphertext_blob: &[u8],
        iv: &[u8],
    ) -> KmsResult<Zeroizing<Vec<u8>>> {
        let plaintext = open(self.master_key.as_bytes(), iv, ciphertext_blob)?;
        Ok(Zeroizing::new(plaintext))
    }
}
