//! Session establishment: ephemeral key agreement and peer authentication.
//!
//! Ordering is fixed by role and opposite on the two ends, so progress is
//! guaranteed on a reliable full-duplex stream: the initiator writes its
//! public key and reads the peer's; the responder reads first and answers.
//! When a pre-shared secret is configured the same pattern repeats for the
//! 32-byte authenticator, with the responder verifying before it replies.
//!
//! A failed verification and a dropped connection look identical from the
//! other side; neither peer learns whether the secret itself was wrong.

use crate::frame::{read_handshake, write_handshake};
use crate::transport::{Transport, TransportIo};
use crate::{Error, Result};
use std::time::Duration;
use xfer_crypto::aead::RecordCipher;
use xfer_crypto::auth::{compute_auth, verify_auth};
use xfer_crypto::kdf::session_key;
use xfer_crypto::kex::EphemeralKeyPair;
use zeroize::Zeroizing;

/// Which side of the handshake this endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Writes its public key (and authenticator) first.
    Initiator,
    /// Reads the peer's frame first, then answers.
    Responder,
}

/// Options for establishing a secure session.
pub struct SecureConfig {
    /// Handshake ordering.
    pub role: Role,
    /// Pre-shared secret authenticating the exchange. `None` or empty skips
    /// the authenticator round.
    pub pre_shared_secret: Option<Zeroizing<Vec<u8>>>,
    /// Deadline applied to the transport for the duration of the handshake
    /// and cleared before the session is handed back.
    pub handshake_timeout: Option<Duration>,
}

impl SecureConfig {
    /// Config with no pre-shared secret and no handshake deadline.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            pre_shared_secret: None,
            handshake_timeout: None,
        }
    }

    /// Authenticate the handshake with a pre-shared secret.
    pub fn with_pre_shared_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.pre_shared_secret = Some(Zeroizing::new(secret.into()));
        self
    }

    /// Bound the whole handshake by a deadline.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = Some(timeout);
        self
    }

    /// The effective secret; empty secrets mean no authentication.
    fn secret(&self) -> Option<&[u8]> {
        match &self.pre_shared_secret {
            Some(secret) if !secret.is_empty() => Some(secret.as_slice()),
            _ => None,
        }
    }
}

/// Run the handshake over `stream` and derive the session's record cipher.
pub(crate) fn perform<S: Transport>(stream: &S, config: &SecureConfig) -> Result<RecordCipher> {
    let keypair = EphemeralKeyPair::generate().map_err(Error::InternalCrypto)?;
    let mut io = TransportIo(stream);

    let peer_public = match config.role {
        Role::Initiator => {
            write_handshake(&mut io, keypair.public_key())?;
            read_handshake(&mut io)?
        }
        Role::Responder => {
            let peer = read_handshake(&mut io)?;
            write_handshake(&mut io, keypair.public_key())?;
            peer
        }
    };

    let shared = keypair
        .exchange(&peer_public)
        .map_err(|_| Error::InvalidPeerKey)?;

    if let Some(secret) = config.secret() {
        let auth = compute_auth(secret, &shared[..], keypair.public_key(), &peer_public)
            .map_err(Error::InternalCrypto)?;

        match config.role {
            Role::Initiator => {
                write_handshake(&mut io, &auth[..])?;
                let peer_auth = read_handshake(&mut io)?;
                if !verify_auth(&auth[..], &peer_auth) {
                    return Err(Error::AuthMismatch);
                }
            }
            Role::Responder => {
                let peer_auth = read_handshake(&mut io)?;
                if !verify_auth(&auth[..], &peer_auth) {
                    return Err(Error::AuthMismatch);
                }
                write_handshake(&mut io, &auth[..])?;
            }
        }
    }

    let key = session_key(&shared[..]);
    RecordCipher::new(&key).map_err(Error::InternalCrypto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_disables_authentication() {
        let config = SecureConfig::new(Role::Initiator).with_pre_shared_secret("");
        assert!(config.secret().is_none());

        let config = SecureConfig::new(Role::Initiator);
        assert!(config.secret().is_none());

        let config = SecureConfig::new(Role::Initiator).with_pre_shared_secret("my-secret-key");
        assert_eq!(config.secret(), Some(&b"my-secret-key"[..]));
    }
}
