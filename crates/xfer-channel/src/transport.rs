//! Blocking duplex transport abstraction.
//!
//! The secure channel needs four things from its carrier: ordered reliable
//! byte transport, addressable endpoints, settable read/write deadlines, and
//! (optionally) half-close. Methods take `&self` so one reader thread and
//! one writer thread can share a connection, the same way std hands out
//! `Read`/`Write` on `&TcpStream`.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

/// Ordered, reliable, full-duplex byte transport.
pub trait Transport: Send + Sync {
    /// Read bytes, blocking until data arrives, the peer closes, or the
    /// read deadline trips.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write bytes, blocking until accepted or the write deadline trips.
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Local endpoint address.
    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// Remote endpoint address.
    fn peer_addr(&self) -> io::Result<SocketAddr>;

    /// Set or clear the read deadline.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Set or clear the write deadline.
    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Close both directions of the transport.
    fn close(&self) -> io::Result<()>;

    /// Close the write side only, signalling end-of-stream to the peer while
    /// reads continue.
    ///
    /// Transports without half-close return `ErrorKind::Unsupported`.
    fn close_write(&self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "transport does not support half-close",
        ))
    }

    /// Write the whole buffer or fail.
    fn write_all(&self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            let n = self.write(buf)?;
            if n == 0 {
                return Err(io::ErrorKind::WriteZero.into());
            }
            buf = &buf[n..];
        }
        Ok(())
    }
}

impl Transport for TcpStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut conn = self;
        Read::read(&mut conn, buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        let mut conn = self;
        Write::write(&mut conn, buf)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::local_addr(self)
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        TcpStream::peer_addr(self)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_write_timeout(self, timeout)
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }

    fn close_write(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Write)
    }
}

/// Adapter exposing a `Transport` through `io::Read`/`io::Write`, so the
/// framing codec can stay generic over plain readers and writers.
pub(crate) struct TransportIo<'a, S: Transport + ?Sized>(pub &'a S);

impl<S: Transport + ?Sized> Read for TransportIo<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<S: Transport + ?Sized> Write for TransportIo<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// TcpStream supports half-close: the peer sees EOF while the other
    /// direction keeps flowing.
    #[test]
    fn test_tcp_close_write() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = Transport::read(&conn, &mut buf).unwrap();
            assert_eq!(&buf[..n], b"ping");
            // After the client's half-close we must see EOF.
            assert_eq!(Transport::read(&conn, &mut buf).unwrap(), 0);
            Transport::write_all(&conn, b"pong").unwrap();
        });

        let client = TcpStream::connect(addr).unwrap();
        Transport::write_all(&client, b"ping").unwrap();
        client.close_write().unwrap();

        let mut buf = [0u8; 16];
        let n = Transport::read(&client, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"pong");

        server.join().unwrap();
    }
}
