//! Key client configuration.

use crate::error::{KmsError, KmsResult};
use kmsenv_crypto::MASTER_KEY_SIZES;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that supplies the development master key when the
/// config file leaves `dev_cmk` empty.
pub const DEV_CMK_ENV: &str = "KMSENV_DEV_CMK";

/// Which key service backs the client. Chosen once, at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KmsMode {
    Remote,
    LocalDev,
}

/// Configuration for [`KmsClient`](crate::KmsClient).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KmsConfig {
    /// Optional PEM CA bundle trusted for the KMS endpoint.
    #[serde(rename = "ca_filepath")]
    pub ca_file_path: Option<PathBuf>,

    /// URL scheme used when `endpoint` has none (e.g. "https").
    #[serde(alias = "protocal")]
    pub protocol: String,

    /// Client key content presented to the KMS instance.
    #[serde(rename = "clientkey_content")]
    pub client_key_content: String,

    /// Password protecting the client key.
    pub password: String,

    /// KMS instance endpoint (e.g., "kst-xxx.cryptoservice.kms.aliyuncs.com").
    pub endpoint: String,

    /// Accept invalid TLS certificates. Development only.
    pub ignore_ssl: bool,

    /// Per-request timeout for remote calls, in seconds.
    pub timeout_secs: u64,

    /// Use the local development master key instead of the remote service.
    pub is_dev: bool,

    /// Local development master key; must be 16, 24 or 32 bytes.
    pub dev_cmk: String,

    /// Maximum number of decrypted data keys kept in memory.
    pub cache_capacity: usize,
}

impl Default for KmsConfig {
    fn default() -> Self {
        Self {
            ca_file_path: None,
            protocol: "https".to_string(),
            client_key_content: String::new(),
            password: String::new(),
            endpoint: String::new(),
            ignore_ssl: false,
            timeout_secs: 30,
            is_dev: false,
            dev_cmk: String::new(),
            cache_capacity: 1000,
        }
    }
}

impl fmt::Debug for KmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsConfig")
            .field("ca_file_path", &self.ca_file_path)
            .field("protocol", &self.protocol)
            .field("client_key_content", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("ignore_ssl", &self.ignore_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .field("is_dev", &self.is_dev)
            .field("dev_cmk", &"[REDACTED]")
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

impl KmsConfig {
    /// Creates a local development config around the given master key.
    pub fn local_dev(dev_cmk: impl Into<String>) -> Self {
        Self {
            is_dev: true,
            dev_cmk: dev_cmk.into(),
            ..Default::default()
        }
    }

    /// Creates a remote config for a KMS instance endpoint.
    pub fn remote(
        endpoint: impl Into<String>,
        client_key_content: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            client_key_content: client_key_content.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Parses a JSON config. Does not validate; see [`KmsConfig::validate`].
    pub fn from_json_str(json: &str) -> KmsResult<Self> {
        serde_json::from_str(json).map_err(|e| KmsError::Config(format!("invalid config JSON: {e}")))
    }

    /// Reads a JSON config file and applies environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> KmsResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| KmsError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_json_str(&json)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Fills `dev_cmk` from `KMSENV_DEV_CMK` when it is empty.
    pub fn apply_env_overrides(&mut self) {
        if self.dev_cmk.is_empty() {
            if let Ok(cmk) = std::env::var(DEV_CMK_ENV) {
                self.dev_cmk = cmk;
            }
        }
    }

    pub fn mode(&self) -> KmsMode {
        if self.is_dev {
            KmsMode::LocalDev
        } else {
            KmsMode::Remote
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint as a base URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("{}://{endpoint}", self.protocol)
        }
    }

    /// Checks the settings the selected mode depends on.
    pub fn validate(&self) -> KmsResult<()> {
        if self.cache_capacity == 0 {
            return Err(KmsError::Config("cache_capacity must be at least 1".to_string()));
        }
        match self.mode() {
            KmsMode::LocalDev => {
                let len = self.dev_cmk.len();
                if !MASTER_KEY_SIZES.contains(&len) {
                    return Err(KmsError::Config(format!(
                        "dev_cmk must be 16, 24 or 32 bytes, got {len}"
                    )));
                }
            }
            KmsMode::Remote => {
                if self.endpoint.trim().is_empty() {
                    return Err(KmsError::Config("remote mode requires an endpoint".to_string()));
                }
                if self.client_key_content.is_empty() {
                    return Err(KmsError::Config(
                        "remote mode requires clientkey_content".to_string(),
                    ));
                }
                if self.timeout_secs == 0 {
                    return Err(KmsError::Config("timeout_secs must be at least 1".to_string()));
                }
            }
        }
        Ok(())
    }
}
