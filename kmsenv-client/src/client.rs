//! The key client: one key service plus the decrypted data-key cache.

use crate::cache::DataKeyCache;
use crate::config::{KmsConfig, KmsMode};
use crate::error::{KmsError, KmsResult};
use crate::local::LocalDevKeyService;
use crate::remote::RemoteKeyService;
use crate::service::KeyService;
use crate::types::{EncryptedBlob, GeneratedDataKey};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Largest data key a caller may request.
pub const MAX_DATA_KEY_BYTES: usize = 1024;

/// Generates and unwraps data keys through a [`KeyService`].
///
/// Construct one per process and share it (`Arc<KmsClient>`); the cache is
/// the only mutable state and is safe for concurrent use.
pub struct KmsClient {
    service: Arc<dyn KeyService>,
    cache: DataKeyCache,
}

impl KmsClient {
    /// Validates `config` and selects the remote or local-dev service.
    pub fn from_config(config: &KmsConfig) -> KmsResult<Self> {
        config.validate()?;

        let service: Arc<dyn KeyService> = match config.mode() {
            KmsMode::LocalDev => Arc::new(LocalDevKeyService::new(config.dev_cmk.as_bytes())?),
            KmsMode::Remote => Arc::new(RemoteKeyService::new(config)?),
        };

        info!(
            "initialized KMS client ({} service, cache capacity {})",
            service.name(),
            config.cache_capacity
        );
        Self::with_service(service, config.cache_capacity)
    }

    /// Wraps an existing service. Used for custom backends and tests.
    pub fn with_service(service: Arc<dyn KeyService>, cache_capacity: usize) -> KmsResult<Self> {
        let capacity = NonZeroUsize::new(cache_capacity)
            .ok_or_else(|| KmsError::Config("cache_capacity must be at least 1".to_string()))?;
        Ok(Self {
            service,
            cache: DataKeyCache::new(capacity),
        })
    }

    pub fn service_name(&self) -> &'static str {
        self.service.name()
    }

    pub fn cache(&self) -> &DataKeyCache {
        &self.cache
    }

    /// Issues a fresh data key of `number_of_bytes` under master key `key_id`.
    pub async fn generate_data_key(
        &self,
        key_id: &str,
        number_of_bytes: usize,
    ) -> KmsResult<GeneratedDataKey> {
        if number_of_bytes == 0 || number_of_bytes > MAX_DATA_KEY_BYTES {
            return Err(KmsError::InvalidRequest(format!(
                "data key size must be 1..={MAX_DATA_KEY_BYTES} bytes, got {number_of_bytes}"
            )));
        }
        debug!("generating {number_of_bytes}-byte data key via {} service", self.service.name());
        self.service.generate_data_key(key_id, number_of_bytes).await
    }

    /// Unwraps a data key, consulting the cache first.
    ///
    /// A miss calls the service and caches the result; failures are never
    /// cached. Two concurrent misses for the same key may both reach the
    /// service; they yield the same plaintext and leave one cache entry.
    pub async fn decrypt_data_key(
        &self,
        key_id: &str,
        encrypted_key: &[u8],
        iv: &[u8],
    ) -> KmsResult<Zeroizing<Vec<u8>>> {
        if let Some(plaintext) = self.cache.get(encrypted_key).await {
            debug!("data key cache hit");
            return Ok(plaintext);
        }

        debug!("data key cache miss, decrypting via {} service", self.service.name());
        let plaintext = self.service.decrypt(key_id, encrypted_key, iv).await?;
        self.cache.insert(encrypted_key, plaintext.clone()).await;
        Ok(plaintext)
    }

    /// Encrypts a small payload directly under the master key. Not cached.
    pub async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptedBlob> {
        self.service.encrypt(key_id, plaintext).await
    }

    /// Decrypts a payload produced by [`KmsClient::encrypt`]. Not cached.
    pub async fn decrypt(
        &self,
        key_id: &str,
        ciphertext_blob: &[u8],
        iv: &[u8],
    ) -> KmsResult<Zeroizing<Vec<u8>>> {
        self.service.decrypt(key_id, ciphertext_blob, iv).await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}
