//! Ephemeral Diffie-Hellman key exchange over NIST P-256.
//!
//! One keypair is generated per session and discarded when the handshake
//! finishes. Public keys travel in uncompressed form (0x04 || x || y, 65
//! bytes) per SEC 1; peer keys are validated as curve points before use.
//!
//! # Security
//!
//! - The private scalar lives in `p256::SecretKey`, which zeroes itself on
//!   drop; the shared secret is returned in `Zeroizing<>`.
//! - Point validation is delegated to the `p256` crate's high-level ECDH API.

use crate::{Error, Result};
use p256::ecdh::diffie_hellman;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, PublicKey, SecretKey};
use zeroize::Zeroizing;

/// Length of an uncompressed SEC1 P-256 public key.
pub const PUBLIC_KEY_LEN: usize = 65;

/// Length of the ECDH shared secret (x-coordinate).
pub const SHARED_SECRET_LEN: usize = 32;

/// Ephemeral P-256 keypair for one handshake.
///
/// The public key is cached in its 65-byte uncompressed encoding, ready to
/// be written to the wire.
pub struct EphemeralKeyPair {
    secret_key: SecretKey,
    public_key_bytes: [u8; PUBLIC_KEY_LEN],
}

impl EphemeralKeyPair {
    /// Generate a fresh random keypair using the OS cryptographic RNG.
    pub fn generate() -> Result<Self> {
        let secret_key = SecretKey::random(&mut rand::rngs::OsRng);
        Self::from_secret(secret_key)
    }

    /// Build a keypair from a raw 32-byte private scalar.
    ///
    /// Used for known-answer tests; sessions always use [`generate`].
    ///
    /// [`generate`]: Self::generate
    pub fn from_private(private_key: &[u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|_| Error::InvalidPrivateKey("scalar out of range for P-256".into()))?;
        Self::from_secret(secret_key)
    }

    fn from_secret(secret_key: SecretKey) -> Result<Self> {
        let encoded = secret_key.public_key().to_encoded_point(false);
        let mut public_key_bytes = [0u8; PUBLIC_KEY_LEN];
        if encoded.as_bytes().len() != PUBLIC_KEY_LEN {
            return Err(Error::KeyGeneration(
                "unexpected public key encoding length".into(),
            ));
        }
        public_key_bytes.copy_from_slice(encoded.as_bytes());
        Ok(Self {
            secret_key,
            public_key_bytes,
        })
    }

    /// The public key in uncompressed SEC1 form (65 bytes, leading 0x04).
    pub fn public_key(&self) -> &[u8] {
        &self.public_key_bytes
    }

    /// Perform ECDH with a peer's uncompressed public key.
    ///
    /// Returns the 32-byte shared secret (the x-coordinate of the resulting
    /// point) wrapped in `Zeroizing`.
    ///
    /// # Errors
    ///
    /// Rejects keys of the wrong length, keys not in uncompressed form, and
    /// encodings that do not decode to a valid point on the curve.
    pub fn exchange(&self, peer_public: &[u8]) -> Result<Zeroizing<[u8; SHARED_SECRET_LEN]>> {
        if peer_public.len() != PUBLIC_KEY_LEN {
            return Err(Error::InvalidPublicKey(format!(
                "P-256 public key must be {} bytes (uncompressed), got {}",
                PUBLIC_KEY_LEN,
                peer_public.len()
            )));
        }
        if peer_public[0] != 0x04 {
            return Err(Error::InvalidPublicKey(
                "P-256 public key must use the uncompressed 0x04 prefix".into(),
            ));
        }

        let encoded = EncodedPoint::from_bytes(peer_public)
            .map_err(|_| Error::InvalidPublicKey("malformed SEC1 encoding".into()))?;
        let peer_key: PublicKey = Option::from(PublicKey::from_encoded_point(&encoded))
            .ok_or_else(|| Error::InvalidPublicKey("point is not on the P-256 curve".into()))?;

        let shared = diffie_hellman(self.secret_key.to_nonzero_scalar(), peer_key.as_affine());

        let mut result = [0u8; SHARED_SECRET_LEN];
        result.copy_from_slice(shared.raw_secret_bytes().as_slice());
        Ok(Zeroizing::new(result))
    }
}
