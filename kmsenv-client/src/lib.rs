//! Envelope encryption over a key-management service.
//!
//! Provides:
//! - A key client that generates and unwraps data keys through a remote
//!   KMS instance, or through a local master key during development
//! - An LRU cache of decrypted data keys shared across callers
//! - Envelope encryption of content with AES-256-GCM
//! - A compact `.`-separated string form for stored envelopes

pub mod cache;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod local;
pub mod remote;
pub mod service;
pub mod types;

pub use cache::DataKeyCache;
pub use client::KmsClient;
pub use config::{KmsConfig, KmsMode};
pub use envelope::{EnvelopeCipher, EnvelopeCipherObject};
pub use error::{KmsError, KmsResult};
pub use service::KeyService;
pub use types::*;
