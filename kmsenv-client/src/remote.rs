//! HTTP client for a KMS instance.
//!
//! Speaks the instance's JSON API: one `POST` per action
//! (`GenerateDataKey`, `Encrypt`, `Decrypt`) with PascalCase fields and
//! base64 byte fields. Uses reqwest with a per-request timeout.

use crate::config::KmsConfig;
use crate::error::{KmsError, KmsResult};
use crate::service::KeyService;
use crate::types::{EncryptedBlob, GeneratedDataKey};
use async_trait::async_trait;
use reqwest::{Certificate, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Header carrying the client key password, when one is configured.
pub const PASSWORD_HEADER: &str = "x-kms-client-key-password";

/// Key service backed by a remote KMS instance.
pub struct RemoteKeyService {
    client: Client,
    base_url: String,
    client_key_content: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GenerateDataKeyRequest<'a> {
    key_id: &'a str,
    number_of_bytes: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GenerateDataKeyResponse {
    #[serde(default)]
    key_id: String,
    #[serde(with = "b64")]
    iv: Vec<u8>,
    #[serde(with = "b64")]
    plaintext: Vec<u8>,
    #[serde(with = "b64")]
    ciphertext_blob: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EncryptRequest<'a> {
    key_id: &'a str,
    #[serde(with = "b64")]
    plaintext: &'a [u8],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EncryptResponse {
    #[serde(default)]
    key_id: String,
    #[serde(with = "b64")]
    iv: Vec<u8>,
    #[serde(with = "b64")]
    ciphertext_blob: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DecryptRequest<'a> {
    key_id: &'a str,
    #[serde(with = "b64")]
    ciphertext_blob: &'a [u8],
    #[serde(with = "b64")]
    iv: &'a [u8],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DecryptResponse {
    #[serde(with = "b64")]
    plaintext: Vec<u8>,
}

impl RemoteKeyService {
    /// Builds the HTTP client from `config`.
    ///
    /// Fails with [`KmsError::Config`] when the endpoint or client key is
    /// missing, or when the CA file cannot be loaded.
    pub fn new(config: &KmsConfig) -> KmsResult<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(KmsError::Config("remote mode requires an endpoint".to_string()));
        }
        if config.client_key_content.is_empty() {
            return Err(KmsError::Config(
                "remote mode requires clientkey_content".to_string(),
            ));
        }

        let base_url = config.base_url();
        let mut builder = Client::builder().timeout(config.timeout());

        if let Some(path) = &config.ca_file_path {
            let pem = std::fs::read(path).map_err(|e| {
                KmsError::Config(format!("cannot read CA file {}: {e}", path.display()))
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                KmsError::Config(format!("invalid CA certificate {}: {e}", path.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if config.ignore_ssl {
            warn!("TLS certificate verification disabled for {base_url}");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| KmsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            client_key_content: config.client_key_content.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts one action and decodes its JSON response.
    async fn call<B, R>(&self, action: &str, body: &B) -> KmsResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{action}", self.base_url);
        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.client_key_content)
            .json(body);
        if !self.password.is_empty() {
            request = request.header(PASSWORD_HEADER, &self.password);
        }

        let resp = request.send().await.map_err(|e| {
            warn!("{action} request to key service failed: {e}");
            e
        })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            warn!("{action} rejected by key service with {status}");
            return Err(KmsError::Service(format!("{action} returned {status}: {detail}")));
        }

        debug!("{action} succeeded");
        resp.json()
            .await
            .map_err(|e| KmsError::Service(format!("{action} returned an unreadable body: {e}")))
    }
}

#[async_trait]
impl KeyService for RemoteKeyService {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn generate_data_key(
        &self,
        key_id: &str,
        number_of_bytes: usize,
    ) -> KmsResult<GeneratedDataKey> {
        let resp: GenerateDataKeyResponse = self
            .call(
                "GenerateDataKey",
                &GenerateDataKeyRequest {
                    key_id,
                    number_of_bytes,
                },
            )
            .await?;

        let plaintext = Zeroizing::new(resp.plaintext);
        if plaintext.len() != number_of_bytes {
            return Err(KmsError::Service(format!(
                "GenerateDataKey returned {} bytes, requested {number_of_bytes}",
                plaintext.len()
            )));
        }

        Ok(GeneratedDataKey {
            key_id: if resp.key_id.is_empty() {
                key_id.to_string()
            } else {
                resp.key_id
            },
            plaintext,
            ciphertext_blob: resp.ciphertext_blob,
            iv: resp.iv,
        })
    }

    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptedBlob> {
        let resp: EncryptResponse = self
            .call("Encrypt", &EncryptRequest { key_id, plaintext })
            .await?;

        Ok(EncryptedBlob {
            key_id: if resp.key_id.is_empty() {
                key_id.to_string()
            } else {
                resp.key_id
            },
            ciphertext_blob: resp.ciphertext_blob,
            iv: resp.iv,
        })
    }

    async fn decrypt(
        &self,
        key_id: &str,
        ciphertext_blob: &[u8],
        iv: &[u8],
    ) -> KmsResult<Zeroizing<Vec<u8>>> {
        let resp: DecryptResponse = self
            .call(
                "Decrypt",
                &DecryptRequest {
                    key_id,
                    ciphertext_blob,
                    iv,
                },
            )
            .await?;
        Ok(Zeroizing::new(resp.plaintext))
    }
}

/// Standard padded base64 for byte fields in the KMS JSON API.
mod b64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<[u8]>,
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}
