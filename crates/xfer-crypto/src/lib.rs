//! Cryptographic primitives for the xfer secure channel.
//!
//! The wire format pins a single suite, implemented here:
//! - Ephemeral key exchange over NIST P-256 (uncompressed SEC1 points)
//! - SHA-256 session-key digest and HKDF-SHA256 derivation
//! - Argon2id-stretched HMAC-SHA-256 handshake authenticator
//! - AES-256-GCM record encryption with random 96-bit nonces
//!
//! Private keys, shared secrets, and derived key material are wrapped in
//! `Zeroizing` so they are cleared from memory on drop. Authenticator
//! comparison is constant-time via the `subtle` crate. Key material is never
//! logged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod auth;
pub mod error;
pub mod kdf;
pub mod kex;

pub use error::{Error, Result};
