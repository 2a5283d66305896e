//! Handshake authenticator for pre-shared-secret sessions.
//!
//! Both peers compute the same 32-byte authenticator over the key exchange:
//! the pre-shared secret is stretched with Argon2id under a per-session
//! salt, HKDF extracts a MAC key from the high-entropy ECDH secret with the
//! stretched secret as salt, and HMAC-SHA-256 binds both public keys and the
//! shared secret into the final value. Mixing both public keys into salt and
//! transcript commits each peer to this exchange, so a mediator cannot splice
//! two handshakes together; stretching first keeps a guessable secret from
//! weakening the MAC key.
//!
//! Public keys are sorted before use, so the computation is symmetric: both
//! ends derive identical bytes and simply compare what the peer sent.

use crate::kdf::hkdf_sha256;
use crate::{Error, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Length of the authenticator exchanged on the wire.
pub const AUTH_LEN: usize = 32;

/// HKDF info label for the per-session MAC key.
const MAC_KEY_INFO: &[u8] = b"xfer-v1 auth";

/// Transcript prefix under the authenticator HMAC.
const TRANSCRIPT_LABEL: &[u8] = b"xfer-v1 handshake";

// Argon2id cost parameters: 3 passes over 64 MiB with 2 lanes.
const ARGON2_TIME_COST: u32 = 3;
const ARGON2_MEMORY_KIB: u32 = 64 * 1024;
const ARGON2_LANES: u32 = 2;

/// Compute the session authenticator.
///
/// # Arguments
/// * `secret` - Pre-shared secret; may be low entropy.
/// * `shared` - ECDH shared secret (high entropy).
/// * `local_public` / `peer_public` - Public key bytes, order irrelevant.
///
/// The result is identical under swapped public-key arguments, which is what
/// lets both peers verify the same value.
pub fn compute_auth(
    secret: &[u8],
    shared: &[u8],
    local_public: &[u8],
    peer_public: &[u8],
) -> Result<Zeroizing<[u8; AUTH_LEN]>> {
    // Canonical ordering so both peers bind an identical transcript.
    let (a, b) = if local_public <= peer_public {
        (local_public, peer_public)
    } else {
        (peer_public, local_public)
    };

    // Per-session salt from the shared secret and both public keys; unique
    // per exchange without an extra round-trip.
    let mut hasher = Sha256::new();
    hasher.update(shared);
    hasher.update(a);
    hasher.update(b);
    let salt = hasher.finalize();

    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_TIME_COST,
        ARGON2_LANES,
        Some(AUTH_LEN),
    )
    .map_err(|e| Error::KeyDerivation(format!("invalid Argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut stretched = Zeroizing::new([0u8; AUTH_LEN]);
    argon2
        .hash_password_into(secret, salt.as_slice(), stretched.as_mut_slice())
        .map_err(|e| Error::KeyDerivation(format!("Argon2id stretch failed: {e}")))?;

    // Extract from the ECDH secret with the stretched secret as salt; the
    // MAC key keeps full strength even when the pre-shared secret is weak.
    let mac_key = hkdf_sha256(shared, stretched.as_slice(), MAC_KEY_INFO, AUTH_LEN)?;

    let mut mac = HmacSha256::new_from_slice(&mac_key)
        .map_err(|_| Error::KeyDerivation("HMAC key rejected".into()))?;
    mac.update(TRANSCRIPT_LABEL);
    mac.update(a);
    mac.update(b);
    mac.update(shared);
    let tag = mac.finalize().into_bytes();

    let mut auth = [0u8; AUTH_LEN];
    auth.copy_from_slice(tag.as_slice());
    Ok(Zeroizing::new(auth))
}

/// Constant-time comparison of a peer's authenticator against the expected
/// value. Never early-exits on the first differing byte.
pub fn verify_auth(expected: &[u8], received: &[u8]) -> bool {
    bool::from(expected.ct_eq(received))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Swapping the public-key arguments must not change the authenticator.
    #[test]
    fn test_symmetric_in_public_key_order() {
        let shared = [0x11u8; 32];
        let pub_a = [0x04u8; 65];
        let mut pub_b = [0x04u8; 65];
        pub_b[64] = 0xFF;

        let auth1 = compute_auth(b"secret", &shared, &pub_a, &pub_b).unwrap();
        let auth2 = compute_auth(b"secret", &shared, &pub_b, &pub_a).unwrap();

        assert_eq!(&auth1[..], &auth2[..]);
    }

    #[test]
    fn test_differs_per_secret() {
        let shared = [0x11u8; 32];
        let pub_a = [0x04u8; 65];
        let pub_b = [0x05u8; 65];

        let auth1 = compute_auth(b"client-key", &shared, &pub_a, &pub_b).unwrap();
        let auth2 = compute_auth(b"server-key", &shared, &pub_a, &pub_b).unwrap();

        assert_ne!(&auth1[..], &auth2[..]);
    }

    #[test]
    fn test_differs_per_shared_secret() {
        let pub_a = [0x04u8; 65];
        let pub_b = [0x05u8; 65];

        let auth1 = compute_auth(b"secret", &[0x11u8; 32], &pub_a, &pub_b).unwrap();
        let auth2 = compute_auth(b"secret", &[0x22u8; 32], &pub_a, &pub_b).unwrap();

        assert_ne!(&auth1[..], &auth2[..]);
    }

    #[test]
    fn test_verify_auth() {
        let auth = [0xABu8; AUTH_LEN];
        let mut other = auth;

        assert!(verify_auth(&auth, &other));

        other[0] ^= 0x01;
        assert!(!verify_auth(&auth, &other));
    }
}
