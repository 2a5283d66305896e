//! Secure channel: framed AEAD records over an ordered byte stream.
//!
//! Wraps any blocking duplex transport behind a handshake that negotiates a
//! session key (ephemeral P-256 Diffie-Hellman, optionally authenticated by
//! a pre-shared secret) and a record layer that chunks, seals, and frames
//! application bytes with AES-256-GCM:
//! - Framing: u16 length-prefixed handshake frames, u32 length-prefixed
//!   record frames, big-endian throughout
//! - Handshake ordering fixed by role (initiator writes first)
//! - Record layer exposed as a duplex byte stream usable by one reader
//!   thread and one writer thread concurrently
//!
//! Every protocol failure is fatal to the session; the transport is closed
//! and no partial session escapes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod frame;
pub mod handshake;
pub mod secure;
pub mod transport;

pub use error::{Error, Result};
pub use handshake::{Role, SecureConfig};
pub use secure::SecureStream;
pub use transport::Transport;
