//! Envelope encryption of content and the envelope wire format.
//!
//! Content is sealed with AES-256-GCM under a one-time data key. The
//! resulting [`EnvelopeCipherObject`] keeps only the wrapped data key, so
//! decrypting requires the key service (or its cache).
//!
//! Wire form: four `.`-separated fields, each unpadded standard base64:
//!
//! ```text
//! data_key_iv . encrypted_data_key . iv . cipher_text
//! ```

use crate::client::KmsClient;
use crate::error::{KmsError, KmsResult};
use crate::types::GeneratedDataKey;
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use kmsenv_crypto::{DATA_KEY_SIZE, DataKey, generate_iv, open, seal};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Separator between the encoded envelope fields.
pub const ENVELOPE_DELIMITER: char = '.';

const FIELD_COUNT: usize = 4;

/// Ciphertext plus everything needed to decrypt it, except the master key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeCipherObject {
    data_key_iv: Vec<u8>,
    encrypted_data_key: Vec<u8>,
    iv: Vec<u8>,
    cipher_text: Vec<u8>,
}

impl EnvelopeCipherObject {
    pub fn new(
        data_key_iv: Vec<u8>,
        encrypted_data_key: Vec<u8>,
        iv: Vec<u8>,
        cipher_text: Vec<u8>,
    ) -> Self {
        Self {
            data_key_iv,
            encrypted_data_key,
            iv,
            cipher_text,
        }
    }

    /// IV the key service used to wrap the data key.
    pub fn data_key_iv(&self) -> &[u8] {
        &self.data_key_iv
    }

    /// Data key wrapped under the master key.
    pub fn encrypted_data_key(&self) -> &[u8] {
        &self.encrypted_data_key
    }

    /// Content IV (12 bytes).
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Content ciphertext with the GCM tag appended.
    pub fn cipher_text(&self) -> &[u8] {
        &self.cipher_text
    }

    pub fn encode_to_string(&self) -> String {
        [
            &self.data_key_iv,
            &self.encrypted_data_key,
            &self.iv,
            &self.cipher_text,
        ]
        .iter()
        .map(|field| STANDARD_NO_PAD.encode(field))
        .collect::<Vec<_>>()
        .join(".")
    }

    /// Parses the wire form. Fields are assigned by position.
    pub fn decode_from_string(encoded: &str) -> KmsResult<Self> {
        let fields: Vec<&str> = encoded.split(ENVELOPE_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(KmsError::Format(format!(
                "expected {FIELD_COUNT} '{ENVELOPE_DELIMITER}'-separated fields, found {}",
                fields.len()
            )));
        }

        let decode = |index: usize, name: &str| {
            STANDARD_NO_PAD
                .decode(fields[index])
                .map_err(|e| KmsError::Format(format!("{name} is not valid base64: {e}")))
        };

        Ok(Self {
            data_key_iv: decode(0, "data key IV")?,
            encrypted_data_key: decode(1, "encrypted data key")?,
            iv: decode(2, "content IV")?,
            cipher_text: decode(3, "ciphertext")?,
        })
    }
}

impl fmt::Display for EnvelopeCipherObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode_to_string())
    }
}

impl FromStr for EnvelopeCipherObject {
    type Err = KmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode_from_string(s)
    }
}

impl Serialize for EnvelopeCipherObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode_to_string())
    }
}

impl<'de> Deserialize<'de> for EnvelopeCipherObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::decode_from_string(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Encrypts and decrypts content through a shared [`KmsClient`].
#[derive(Clone)]
pub struct EnvelopeCipher {
    client: Arc<KmsClient>,
}

impl EnvelopeCipher {
    pub fn new(client: Arc<KmsClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<KmsClient> {
        &self.client
    }

    /// Encrypts `plaintext` under a newly issued 32-byte data key.
    ///
    /// The plaintext data key is zeroized before this returns.
    pub async fn encrypt_with_fresh_key(
        &self,
        key_id: &str,
        plaintext: &[u8],
    ) -> KmsResult<EnvelopeCipherObject> {
        let data_key = self.client.generate_data_key(key_id, DATA_KEY_SIZE).await?;
        Self::encrypt_with_data_key(&data_key, plaintext)
    }

    /// Encrypts `plaintext` under a data key the caller already holds.
    pub fn encrypt_with_data_key(
        data_key: &GeneratedDataKey,
        plaintext: &[u8],
    ) -> KmsResult<EnvelopeCipherObject> {
        let key = DataKey::from_slice(&data_key.plaintext)?;
        let iv = generate_iv();
        let cipher_text = seal(key.as_bytes(), &iv, plaintext)?;

        Ok(EnvelopeCipherObject {
            data_key_iv: data_key.iv.clone(),
            encrypted_data_key: data_key.ciphertext_blob.clone(),
            iv: iv.to_vec(),
            cipher_text,
        })
    }

    /// Unwraps the data key (cache first) and opens the content.
    ///
    /// A GCM tag mismatch fails with [`KmsError::Crypto`]; altered
    /// plaintext is never returned.
    pub async fn decrypt(&self, key_id: &str, envelope: &EnvelopeCipherObject) -> KmsResult<Vec<u8>> {
        let plain_key = self
            .client
            .decrypt_data_key(key_id, &envelope.encrypted_data_key, &envelope.data_key_iv)
            .await?;
        let key = DataKey::from_slice(&plain_key)?;

        let plaintext = open(key.as_bytes(), &envelope.iv, &envelope.cipher_text)?;
        debug!("opened envelope ({} bytes)", plaintext.len());
        Ok(plaintext)
    }

    /// [`encrypt_with_fresh_key`](Self::encrypt_with_fresh_key) followed by encoding.
    pub async fn encrypt_string(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<String> {
        Ok(self
            .encrypt_with_fresh_key(key_id, plaintext)
            .await?
            .encode_to_string())
    }

    /// Decoding followed by [`decrypt`](Self::decrypt).
    pub async fn decrypt_string(&self, key_id: &str, encoded: &str) -> KmsResult<Vec<u8>> {
        let envelope = EnvelopeCipherObject::decode_from_string(encoded)?;
        self.decrypt(key_id, &envelope).await
    }
}
