//! AES-256-GCM record cipher.
//!
//! One `RecordCipher` is constructed per session from the derived key and
//! treated as immutable afterwards; only nonces and buffers vary between
//! calls. Nonces are drawn fresh from the OS RNG for every record, relying
//! on the birthday bound of random 96-bit nonces, which holds comfortably
//! for any realistic session volume.

use crate::{Error, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// AEAD nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AEAD authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// AES-256-GCM instance bound to one session key.
pub struct RecordCipher {
    cipher: Aes256Gcm,
}

impl RecordCipher {
    /// Build the cipher from a 32-byte session key.
    ///
    /// Failure here means the AEAD could not be constructed at all and is
    /// fatal to the session.
    pub fn new(key: &[u8; 32]) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| Error::CipherInit("invalid AES-256-GCM key length".into()))?;
        Ok(Self { cipher })
    }

    /// Draw a fresh uniformly random nonce from the OS RNG.
    pub fn random_nonce() -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }

    /// Encrypt one record; returns ciphertext with the appended 16-byte tag.
    pub fn seal(&self, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|_| Error::Encryption("AES-256-GCM encryption failed".into()))
    }

    /// Decrypt and authenticate one record.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decryption` if tag verification fails; the caller must
    /// treat the session as broken.
    pub fn open(&self, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::Decryption("AES-256-GCM authentication failed".into()))?;

        Ok(Zeroizing::new(plaintext))
    }
}
