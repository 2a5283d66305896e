//! Error types for the secure channel.

use std::io;
use thiserror::Error;

/// Result type alias for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Secure-channel errors. Every variant is fatal to the session; the only
/// recovery is tearing the connection down.
#[derive(Debug, Error)]
pub enum Error {
    /// Peer public key failed point validation.
    #[error("invalid peer public key")]
    InvalidPeerKey,

    /// Authenticator comparison failed.
    #[error("handshake authentication failed")]
    AuthMismatch,

    /// Record frame length below the minimum.
    #[error("invalid record frame length {0}")]
    InvalidFrame(u32),

    /// Record frame length above the inbound ceiling.
    #[error("record frame of {0} bytes exceeds the inbound ceiling")]
    FrameTooLarge(u32),

    /// AEAD tag verification failed.
    #[error("record decryption failed")]
    DecryptFailed,

    /// Handshake payload too large for the 16-bit length prefix.
    #[error("handshake message of {0} bytes is too long")]
    MessageTooLong(usize),

    /// Underlying stream closed mid-frame.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// Deadline elapsed on the underlying stream.
    #[error("i/o timeout")]
    IoTimeout,

    /// Any other transport error.
    #[error("i/o error: {0}")]
    Io(#[source] io::Error),

    /// Cryptographic primitive failed to initialize or operate.
    #[error("internal crypto failure: {0}")]
    InternalCrypto(#[source] xfer_crypto::Error),

    /// The underlying stream does not support half-close.
    #[error("half-close not supported by the underlying stream")]
    HalfCloseUnsupported,

    /// A previous fatal error left the session unusable.
    #[error("session is broken")]
    SessionBroken,
}

impl From<io::Error> for Error {
    /// Classify a transport error: end-of-stream and deadline kinds get
    /// their own variants, everything else stays an I/O error.
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::UnexpectedEof,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::IoTimeout,
            _ => Error::Io(err),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(inner) => inner,
            other => io::Error::new(kind_of(&other), other),
        }
    }
}

fn kind_of(err: &Error) -> io::ErrorKind {
    match err {
        Error::UnexpectedEof => io::ErrorKind::UnexpectedEof,
        Error::IoTimeout => io::ErrorKind::TimedOut,
        Error::InvalidFrame(_)
        | Error::FrameTooLarge(_)
        | Error::DecryptFailed
        | Error::MessageTooLong(_) => io::ErrorKind::InvalidData,
        Error::HalfCloseUnsupported => io::ErrorKind::Unsupported,
        Error::SessionBroken => io::ErrorKind::BrokenPipe,
        _ => io::ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_classification() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(Error::from(eof), Error::UnexpectedEof));

        let timeout = io::Error::new(io::ErrorKind::TimedOut, "deadline");
        assert!(matches!(Error::from(timeout), Error::IoTimeout));

        let blocked = io::Error::new(io::ErrorKind::WouldBlock, "deadline");
        assert!(matches!(Error::from(blocked), Error::IoTimeout));

        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "no");
        assert!(matches!(Error::from(refused), Error::Io(_)));
    }

    /// Channel errors survive the trip through `io::Error` for downcasting.
    #[test]
    fn test_io_error_roundtrip() {
        let err: io::Error = Error::DecryptFailed.into();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let inner = err.get_ref().and_then(|e| e.downcast_ref::<Error>());
        assert!(matches!(inner, Some(Error::DecryptFailed)));
    }
}
