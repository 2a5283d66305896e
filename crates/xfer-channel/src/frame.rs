//! Length-prefixed framing for the handshake and record streams.
//!
//! Two framings share the connection in sequence, both big-endian:
//! - Handshake frames: u16 length then payload, used only during setup.
//!   A zero length is legal and carries an empty payload.
//! - Record frames: u32 length then `nonce || ciphertext+tag`.
//!
//! Readers block until the declared payload is complete; a peer closing
//! mid-frame surfaces `UnexpectedEof`. Writers emit header and payload as a
//! single contiguous write so concurrent observers see whole frames.

use crate::{Error, Result};
use std::io::{self, Read, Write};
use xfer_crypto::aead::{NONCE_LEN, TAG_LEN};

/// Maximum plaintext bytes sealed into one outbound record.
pub const MAX_CHUNK: usize = 32 * 1024;

/// Ceiling on inbound record payloads: 64 KiB of plaintext plus AEAD
/// overhead. Anything larger is rejected before the payload is read, so a
/// hostile length field cannot force a huge allocation.
pub const MAX_INBOUND_RECORD: u32 = (NONCE_LEN + 64 * 1024 + TAG_LEN) as u32;

/// Write one handshake frame (u16 length prefix).
pub fn write_handshake<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    if payload.len() > u16::MAX as usize {
        return Err(Error::MessageTooLong(payload.len()));
    }

    let mut buf = Vec::with_capacity(2 + payload.len());
    buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buf.extend_from_slice(payload);
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Read one handshake frame, blocking until the payload is complete.
pub fn read_handshake<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; 2];
    reader.read_exact(&mut header)?;

    let len = u16::from_be_bytes(header) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

/// Write one record frame (u32 length prefix over `nonce || ciphertext`).
pub fn write_record<W: Write>(writer: &mut W, nonce: &[u8], ciphertext: &[u8]) -> Result<()> {
    let len = (nonce.len() + ciphertext.len()) as u32;

    let mut buf = Vec::with_capacity(4 + nonce.len() + ciphertext.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(ciphertext);
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Read one record frame, returning the raw `nonce || ciphertext` payload.
///
/// Returns `None` on a clean end-of-stream at a frame boundary; EOF inside
/// a frame is `UnexpectedEof`. Lengths below the nonce size or above
/// [`MAX_INBOUND_RECORD`] are rejected without reading the payload.
pub fn read_record<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(Error::UnexpectedEof),
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_be_bytes(header);
    if len < NONCE_LEN as u32 {
        return Err(Error::InvalidFrame(len));
    }
    if len > MAX_INBOUND_RECORD {
        return Err(Error::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_handshake_roundtrip() {
        let mut wire = Vec::new();
        write_handshake(&mut wire, b"hello").unwrap();

        assert_eq!(&wire[..2], &[0, 5]);

        let mut cursor = Cursor::new(wire);
        assert_eq!(read_handshake(&mut cursor).unwrap(), b"hello");
    }

    /// A zero-length handshake frame is legal and yields an empty payload.
    #[test]
    fn test_handshake_empty_payload() {
        let mut wire = Vec::new();
        write_handshake(&mut wire, b"").unwrap();

        assert_eq!(wire, vec![0, 0]);

        let mut cursor = Cursor::new(wire);
        assert!(read_handshake(&mut cursor).unwrap().is_empty());
    }

    #[test]
    fn test_handshake_max_payload() {
        let payload = vec![0xAB; u16::MAX as usize];
        let mut wire = Vec::new();
        write_handshake(&mut wire, &payload).unwrap();

        let mut cursor = Cursor::new(wire);
        assert_eq!(read_handshake(&mut cursor).unwrap(), payload);
    }

    #[test]
    fn test_handshake_too_long() {
        let payload = vec![0u8; u16::MAX as usize + 1];
        let mut wire = Vec::new();

        let err = write_handshake(&mut wire, &payload).unwrap_err();
        assert!(matches!(err, Error::MessageTooLong(n) if n == payload.len()));
        assert!(wire.is_empty());
    }

    #[test]
    fn test_handshake_truncated_payload() {
        // Header declares 5 bytes, only 2 arrive.
        let wire = vec![0, 5, b'h', b'i'];

        let err = read_handshake(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_record_roundtrip() {
        let nonce = [7u8; NONCE_LEN];
        let ciphertext = vec![0xCD; 40];

        let mut wire = Vec::new();
        write_record(&mut wire, &nonce, &ciphertext).unwrap();

        assert_eq!(&wire[..4], &(NONCE_LEN as u32 + 40).to_be_bytes());

        let payload = read_record(&mut Cursor::new(wire)).unwrap().unwrap();
        assert_eq!(&payload[..NONCE_LEN], &nonce);
        assert_eq!(&payload[NONCE_LEN..], &ciphertext[..]);
    }

    /// Clean EOF at a frame boundary is end-of-stream, not an error.
    #[test]
    fn test_record_eof_at_boundary() {
        let wire: Vec<u8> = Vec::new();
        assert!(read_record(&mut Cursor::new(wire)).unwrap().is_none());
    }

    #[test]
    fn test_record_eof_inside_header() {
        let wire = vec![0, 0];
        let err = read_record(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_record_eof_inside_payload() {
        let mut wire = Vec::new();
        write_record(&mut wire, &[0u8; NONCE_LEN], &[1, 2, 3]).unwrap();
        wire.truncate(wire.len() - 1);

        let err = read_record(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    /// Lengths shorter than a nonce cannot be valid records.
    #[test]
    fn test_record_below_minimum() {
        let mut wire = 8u32.to_be_bytes().to_vec();
        wire.extend_from_slice(&[0u8; 8]);

        let err = read_record(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, Error::InvalidFrame(8)));
    }

    #[test]
    fn test_record_above_ceiling() {
        let wire = (MAX_INBOUND_RECORD + 1).to_be_bytes().to_vec();

        let err = read_record(&mut Cursor::new(wire)).unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge(n) if n == MAX_INBOUND_RECORD + 1));
    }

    /// The ceiling itself is still accepted.
    #[test]
    fn test_record_at_ceiling() {
        let payload = vec![0x5A; MAX_INBOUND_RECORD as usize];
        let mut wire = MAX_INBOUND_RECORD.to_be_bytes().to_vec();
        wire.extend_from_slice(&payload);

        let read = read_record(&mut Cursor::new(wire)).unwrap().unwrap();
        assert_eq!(read.len(), payload.len());
    }
}
