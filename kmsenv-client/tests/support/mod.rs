//! Shared test helpers: instrumented key services.

#![allow(dead_code)]

use async_trait::async_trait;
use kmsenv_client::local::LocalDevKeyService;
use kmsenv_client::{EncryptedBlob, GeneratedDataKey, KeyService, KmsClient, KmsError, KmsResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zeroize::Zeroizing;

pub const TEST_KEY_ID: &str = "key-4f1e9c2a";
pub const DEV_CMK: &str = "0123456789abcdef0123456789abcdef";

/// Local-dev service that counts how often each operation reaches it.
pub struct CountingKeyService {
    inner: LocalDevKeyService,
    pub generate_calls: AtomicUsize,
    pub encrypt_calls: AtomicUsize,
    pub decrypt_calls: AtomicUsize,
}

impl CountingKeyService {
    pub fn new() -> Self {
        Self {
            inner: LocalDevKeyService::new(DEV_CMK.as_bytes()).expect("32-byte dev key"),
            generate_calls: AtomicUsize::new(0),
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
        }
    }

    pub fn decrypts(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }

    pub fn generates(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyService for CountingKeyService {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn generate_data_key(
        &self,
        key_id: &str,
        number_of_bytes: usize,
    ) -> KmsResult<GeneratedDataKey> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate_data_key(key_id, number_of_bytes).await
    }

    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptedBlob> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.encrypt(key_id, plaintext).await
    }

    async fn decrypt(
        &self,
        key_id: &str,
        ciphertext_blob: &[u8],
        iv: &[u8],
    ) -> KmsResult<Zeroizing<Vec<u8>>> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decrypt(key_id, ciphertext_blob, iv).await
    }
}

/// Service whose every call fails like an unreachable KMS.
pub struct UnavailableKeyService;

#[async_trait]
impl KeyService for UnavailableKeyService {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn generate_data_key(&self, _: &str, _: usize) -> KmsResult<GeneratedDataKey> {
        Err(KmsError::Service("connection refused".into()))
    }

    async fn encrypt(&self, _: &str, _: &[u8]) -> KmsResult<EncryptedBlob> {
        Err(KmsError::Service("connection refused".into()))
    }

    async fn decrypt(&self, _: &str, _: &[u8], _: &[u8]) -> KmsResult<Zeroizing<Vec<u8>>> {
        Err(KmsError::Service("connection refused".into()))
    }
}

/// Client over a counting service, returning both so tests can assert calls.
pub fn counting_client(cache_capacity: usize) -> (Arc<CountingKeyService>, Arc<KmsClient>) {
    let service = Arc::new(CountingKeyService::new());
    let client = KmsClient::with_service(service.clone(), cache_capacity).expect("valid capacity");
    (service, Arc::new(client))
}
