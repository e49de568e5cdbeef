//! The key service seam.
//!
//! [`KmsClient`](crate::KmsClient) talks to exactly one implementation,
//! picked at construction: [`RemoteKeyService`](crate::remote::RemoteKeyService)
//! for a real KMS instance, or [`LocalDevKeyService`](crate::local::LocalDevKeyService)
//! when only a local master key is available. Callers never branch on mode.

use crate::error::KmsResult;
use crate::types::{EncryptedBlob, GeneratedDataKey};
use async_trait::async_trait;
use zeroize::Zeroizing;

/// Master-key operations offered by a key-management service.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Short label used in log lines.
    fn name(&self) -> &'static str;

    /// Issues a new data key of `number_of_bytes`, returned both in
    /// plaintext and wrapped under the master key `key_id`.
    async fn generate_data_key(
        &self,
        key_id: &str,
        number_of_bytes: usize,
    ) -> KmsResult<GeneratedDataKey>;

    /// Encrypts a small payload directly under the master key.
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptedBlob>;

    /// Reverses [`KeyService::encrypt`] (and data-key wrapping).
    async fn decrypt(
        &self,
        key_id: &str,
        ciphertext_blob: &[u8],
        iv: &[u8],
    ) -> KmsResult<Zeroizing<Vec<u8>>>;
}
