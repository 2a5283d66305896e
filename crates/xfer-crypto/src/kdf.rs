//! Key derivation: HKDF-SHA256 and the session-key digest.

use crate::{Error, Result};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length of the derived AES-256 session key.
pub const SESSION_KEY_LEN: usize = 32;

/// Generic HKDF-SHA256 key derivation per RFC 5869.
///
/// # Arguments
/// * `ikm` - Input key material
/// * `salt` - Salt value (empty slice for no salt)
/// * `info` - Context and application-specific information
/// * `output_len` - Length of output key material
///
/// # Returns
/// Derived key material wrapped in `Zeroizing`.
pub fn hkdf_sha256(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);

    let mut okm = vec![0u8; output_len];
    hk.expand(info, &mut okm)
        .map_err(|_| Error::KeyDerivation("HKDF expansion failed".into()))?;

    Ok(Zeroizing::new(okm))
}

/// Derive the 32-byte AES-256 session key from the ECDH shared secret.
///
/// The session key is the SHA-256 digest of the raw shared secret; this is
/// the frozen derivation both peers must apply.
pub fn session_key(shared: &[u8]) -> Zeroizing<[u8; SESSION_KEY_LEN]> {
    let digest = Sha256::digest(shared);
    let mut key = [0u8; SESSION_KEY_LEN];
    key.copy_from_slice(digest.as_slice());
    Zeroizing::new(key)
}
