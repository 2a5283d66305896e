//! Bidirectional pump between stdio and a connection.
//!
//! Two threads: stdin feeds the connection (half-closing it on EOF so the
//! peer sees end-of-stream), the connection drains to stdout. The relay
//! returns when both directions are done, mirroring classic netcat.

use std::io::{self, Read, Write};
use std::thread;
use tracing::{debug, warn};
use xfer_channel::Transport;

/// Copy buffer size for both directions.
const BUF_SIZE: usize = 32 * 1024;

/// Relay until stdin is exhausted and the peer has closed.
pub fn run<C: Transport>(conn: &C) {
    thread::scope(|scope| {
        scope.spawn(|| {
            match pump_in(conn) {
                Ok(()) => debug!("stdin closed, half-closing connection"),
                Err(err) => warn!("send relay ended: {err}"),
            }
            if conn.close_write().is_err() {
                debug!("half-close unavailable, leaving write side open");
            }
        });

        match pump_out(conn) {
            Ok(()) => debug!("peer closed connection"),
            Err(err) => warn!("receive relay ended: {err}"),
        }
    });
}

fn pump_in<C: Transport>(conn: &C) -> io::Result<()> {
    let mut stdin = io::stdin().lock();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = stdin.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        conn.write_all(&buf[..n])?;
    }
}

fn pump_out<C: Transport>(conn: &C) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = conn.read(&mut buf)?;
        if n == 0 {
            stdout.flush()?;
            return Ok(());
        }
        stdout.write_all(&buf[..n])?;
        stdout.flush()?;
    }
}
