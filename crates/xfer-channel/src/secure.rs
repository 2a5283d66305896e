//! The AEAD record layer and its duplex stream surface.
//!
//! `SecureStream` wraps a transport after the handshake and speaks the
//! record wire format: each write is chunked into at most 32 KiB pieces,
//! every piece sealed under a fresh random nonce and framed with a u32
//! length. Reads consume one record at a time into a plaintext buffer and
//! serve callers from it, so partial consumption works like any byte
//! stream.
//!
//! Read state and write state sit behind independent mutexes: one reader
//! thread and one writer thread can drive the session concurrently, and
//! same-side callers serialize. A fatal record error (bad frame, failed
//! tag) marks the session broken; later calls fail fast.

use crate::frame::{read_record, write_record, MAX_CHUNK};
use crate::handshake::{self, SecureConfig};
use crate::transport::{Transport, TransportIo};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use xfer_crypto::aead::{RecordCipher, NONCE_LEN};

struct ReadState {
    /// Decrypted bytes not yet handed to the caller.
    plaintext: VecDeque<u8>,
}

struct WriteState {
    /// Error left behind by a write that had already made progress; surfaced
    /// on the next call so the byte count of the first one stays truthful.
    pending: Option<Error>,
}

/// Encrypted duplex byte stream over a wrapped transport.
pub struct SecureStream<S: Transport> {
    inner: S,
    cipher: RecordCipher,
    read: Mutex<ReadState>,
    write: Mutex<WriteState>,
    broken: AtomicBool,
    closed: AtomicBool,
}

impl<S: Transport> SecureStream<S> {
    /// Handshake over `stream` and wrap it in the record layer.
    ///
    /// The configured handshake deadline is applied to the transport for
    /// the exchange and cleared before the session is returned. On any
    /// failure the transport is closed and never handed back.
    pub fn wrap(stream: S, config: &SecureConfig) -> Result<Self> {
        match Self::establish(&stream, config) {
            Ok(cipher) => Ok(Self {
                inner: stream,
                cipher,
                read: Mutex::new(ReadState {
                    plaintext: VecDeque::new(),
                }),
                write: Mutex::new(WriteState { pending: None }),
                broken: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
            Err(err) => {
                let _ = stream.close();
                Err(err)
            }
        }
    }

    fn establish(stream: &S, config: &SecureConfig) -> Result<RecordCipher> {
        stream.set_read_timeout(config.handshake_timeout)?;
        stream.set_write_timeout(config.handshake_timeout)?;

        let cipher = handshake::perform(stream, config)?;

        // The handshake deadline must not leak into the session; callers
        // apply their own policy afterwards.
        stream.set_read_timeout(None)?;
        stream.set_write_timeout(None)?;
        Ok(cipher)
    }

    /// Read decrypted bytes, consuming one record from the wire when the
    /// plaintext buffer is empty.
    ///
    /// Returns `Ok(0)` on clean end-of-stream (or an empty `buf`). May
    /// return fewer bytes than requested; the remainder of a record stays
    /// buffered for the next call.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.read.lock().unwrap();

        // Loop guards against empty-plaintext records, which are legal on
        // the wire but must not read as end-of-stream.
        while state.plaintext.is_empty() {
            if self.broken.load(Ordering::Relaxed) {
                return Err(Error::SessionBroken);
            }

            let payload = match read_record(&mut TransportIo(&self.inner)) {
                Ok(Some(payload)) => payload,
                Ok(None) => return Ok(0),
                Err(err) => {
                    if matches!(err, Error::InvalidFrame(_) | Error::FrameTooLarge(_)) {
                        self.broken.store(true, Ordering::Relaxed);
                    }
                    return Err(err);
                }
            };

            let mut nonce = [0u8; NONCE_LEN];
            nonce.copy_from_slice(&payload[..NONCE_LEN]);
            let plaintext = self
                .cipher
                .open(&nonce, &payload[NONCE_LEN..])
                .map_err(|_| {
                    self.broken.store(true, Ordering::Relaxed);
                    Error::DecryptFailed
                })?;

            state.plaintext.extend(plaintext.iter());
        }

        let n = buf.len().min(state.plaintext.len());
        for (dst, byte) in buf.iter_mut().zip(state.plaintext.drain(..n)) {
            *dst = byte;
        }
        Ok(n)
    }

    /// Encrypt and write `buf`, one record per 32 KiB chunk.
    ///
    /// Returns the number of plaintext bytes fully framed. If an error
    /// strikes after earlier chunks went out, the count of those bytes is
    /// returned and the error surfaces on the next call.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        let mut state = self.write.lock().unwrap();

        if let Some(err) = state.pending.take() {
            return Err(err);
        }
        if self.broken.load(Ordering::Relaxed) {
            return Err(Error::SessionBroken);
        }

        let mut total = 0;
        for chunk in buf.chunks(MAX_CHUNK) {
            if let Err(err) = self.seal_one(chunk) {
                if total > 0 {
                    state.pending = Some(err);
                    return Ok(total);
                }
                return Err(err);
            }
            total += chunk.len();
        }
        Ok(total)
    }

    fn seal_one(&self, chunk: &[u8]) -> Result<()> {
        let nonce = RecordCipher::random_nonce();
        let ciphertext = self
            .cipher
            .seal(&nonce, chunk)
            .map_err(Error::InternalCrypto)?;
        write_record(&mut TransportIo(&self.inner), &nonce, &ciphertext)
    }

    /// Local address of the underlying transport.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Remote address of the underlying transport.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.inner.peer_addr()
    }

    /// Set or clear the read deadline on the underlying transport.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.inner.set_read_timeout(timeout)
    }

    /// Set or clear the write deadline on the underlying transport.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.inner.set_write_timeout(timeout)
    }

    /// Close the underlying transport. Idempotent; only the first call
    /// reaches the transport.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.close().map_err(Error::from)
    }

    /// Half-close the write side if the transport supports it.
    pub fn close_write(&self) -> Result<()> {
        self.inner.close_write().map_err(|err| {
            if err.kind() == io::ErrorKind::Unsupported {
                Error::HalfCloseUnsupported
            } else {
                Error::from(err)
            }
        })
    }
}

/// The record layer is itself a transport, so relay glue and layered code
/// can stay generic over plaintext and encrypted connections.
impl<S: Transport> Transport for SecureStream<S> {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        SecureStream::read(self, buf).map_err(Into::into)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        SecureStream::write(self, buf).map_err(Into::into)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        SecureStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        SecureStream::peer_addr(self)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        SecureStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        SecureStream::set_write_timeout(self, timeout)
    }

    fn close(&self) -> io::Result<()> {
        SecureStream::close(self).map_err(Into::into)
    }

    fn close_write(&self) -> io::Result<()> {
        SecureStream::close_write(self).map_err(Into::into)
    }
}

impl<S: Transport> Read for &SecureStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        SecureStream::read(*self, buf).map_err(Into::into)
    }
}

impl<S: Transport> Write for &SecureStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SecureStream::write(*self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Transport> Read for SecureStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        SecureStream::read(&*self, buf).map_err(Into::into)
    }
}

impl<S: Transport> Write for SecureStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SecureStream::write(&*self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
