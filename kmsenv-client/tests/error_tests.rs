use kmsenv_client::KmsError;
use kmsenv_crypto::CryptoError;

#[test]
fn config_error_display() {
    let err = KmsError::Config("dev_cmk must be 16, 24 or 32 bytes, got 15".into());
    assert_eq!(
        err.to_string(),
        "invalid configuration: dev_cmk must be 16, 24 or 32 bytes, got 15"
    );
}

#[test]
fn format_error_display() {
    let err = KmsError::Format("expected 4 '.'-separated fields, found 3".into());
    assert_eq!(
        err.to_string(),
        "malformed envelope: expected 4 '.'-separated fields, found 3"
    );
}

#[test]
fn service_error_display() {
    let err = KmsError::Service("Decrypt returned 403 Forbidden".into());
    assert_eq!(
        err.to_string(),
        "key service request failed: Decrypt returned 403 Forbidden"
    );
}

#[test]
fn invalid_request_display() {
    let err = KmsError::InvalidRequest("data key size must be 1..=1024 bytes, got 0".into());
    assert_eq!(
        err.to_string(),
        "invalid request: data key size must be 1..=1024 bytes, got 0"
    );
}

#[test]
fn from_crypto_error() {
    let err: KmsError = CryptoError::Decryption("authentication failed".into()).into();
    assert!(matches!(err, KmsError::Crypto(_)));
    assert_eq!(
        err.to_string(),
        "crypto error: decryption failed: authentication failed"
    );
}

#[test]
fn crypto_error_displays() {
    assert_eq!(
        CryptoError::InvalidKeyLength { expected: 32, actual: 16 }.to_string(),
        "invalid key length: expected 32 bytes, got 16"
    );
    assert_eq!(
        CryptoError::UnsupportedKeyLength(20).to_string(),
        "unsupported AES key length: 20 bytes (expected 16, 24 or 32)"
    );
    assert_eq!(
        CryptoError::InvalidNonceLength { expected: 12, actual: 8 }.to_string(),
        "invalid nonce length: expected 12 bytes, got 8"
    );
}

#[test]
fn only_service_errors_are_retryable() {
    assert!(KmsError::Service("timeout".into()).is_retryable());
    assert!(!KmsError::Config("bad".into()).is_retryable());
    assert!(!KmsError::Format("bad".into()).is_retryable());
    assert!(!KmsError::InvalidRequest("bad".into()).is_retryable());
    assert!(!KmsError::Crypto(CryptoError::Decryption("tag".into())).is_retryable());
}
