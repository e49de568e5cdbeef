//! Cryptographic primitives for kmsenv.
//!
//! Provides the building blocks used by envelope encryption:
//! - AES-GCM for authenticated encryption (128/192/256-bit keys)
//! - HKDF-SHA256 for deriving data keys from a master key
//! - Key types that zeroize their material on drop
//!
//! # Architecture
//!
//! Envelope encryption uses a two-tier key system:
//!
//! 1. **Master Key**: Held by a key-management service, or configured
//!    locally for development. It only ever wraps data keys.
//!
//! 2. **Data Key**: A fresh 256-bit key per encryption. Content is sealed
//!    with AES-256-GCM under the data key, and the data key itself is
//!    stored only in its wrapped (master-key encrypted) form.

mod cipher;
mod error;
mod kdf;
mod key;

pub use cipher::{NONCE_SIZE, TAG_SIZE, generate_iv, open, seal};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{MAX_DERIVED_LEN, SALT_SIZE, derive_key, random_salt};
pub use key::{DATA_KEY_SIZE, DataKey, MASTER_KEY_SIZES, MasterKey};
