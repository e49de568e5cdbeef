//! Values exchanged with a key service.

use std::fmt;
use zeroize::Zeroizing;

/// A freshly issued data key: the plaintext for local use, and its
/// master-key wrapped form for storage.
pub struct GeneratedDataKey {
    pub key_id: String,
    /// Plaintext data key. Zeroized on drop.
    pub plaintext: Zeroizing<Vec<u8>>,
    /// Data key encrypted under the master key.
    pub ciphertext_blob: Vec<u8>,
    /// IV the key service used to wrap the data key.
    pub iv: Vec<u8>,
}

impl fmt::Debug for GeneratedDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedDataKey")
            .field("key_id", &self.key_id)
            .field("plaintext", &"[REDACTED]")
            .field("ciphertext_blob", &self.ciphertext_blob.len())
            .field("iv", &self.iv.len())
            .finish()
    }
}

/// A payload encrypted directly under the master key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub key_id: String,
    pub ciphertext_blob: Vec<u8>,
    pub iv: Vec<u8>,
}
