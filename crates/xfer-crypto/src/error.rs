//! Error types for cryptographic operations.

use thiserror::Error;

/// Result type alias for cryptographic operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Invalid private key.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Peer public key rejected during validation.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// AEAD encryption failed.
    #[error("AEAD encryption failed: {0}")]
    Encryption(String),

    /// AEAD decryption failed.
    #[error("AEAD decryption failed: {0}")]
    Decryption(String),

    /// Cipher construction failed.
    #[error("cipher construction failed: {0}")]
    CipherInit(String),
}
