//! Connect mode: dial the peer, wrap if secured, relay stdio.

use crate::{relay, Settings};
use anyhow::{Context, Result};
use std::net::TcpStream;
use tracing::info;
use xfer_channel::{Role, SecureStream, Transport};

pub fn run(settings: &Settings) -> Result<()> {
    let stream = TcpStream::connect(&settings.addr)
        .with_context(|| format!("connect error: {}", settings.addr))?;
    info!("connected to {}", settings.addr);

    match settings.secure_config(Role::Initiator) {
        Some(config) => {
            let secured = SecureStream::wrap(stream, &config).context("handshake error")?;
            apply_io_timeout(&secured, settings)?;
            relay::run(&secured);
        }
        None => {
            apply_io_timeout(&stream, settings)?;
            relay::run(&stream);
        }
    }
    Ok(())
}

/// Apply the user's I/O deadline policy to the session.
pub fn apply_io_timeout<C: Transport>(conn: &C, settings: &Settings) -> Result<()> {
    if settings.io_timeout.is_some() {
        conn.set_read_timeout(settings.io_timeout)
            .context("set read timeout")?;
        conn.set_write_timeout(settings.io_timeout)
            .context("set write timeout")?;
    }
    Ok(())
}
