//! Listen mode: accept connections and relay each over stdio.

use crate::client::apply_io_timeout;
use crate::{relay, Settings};
use anyhow::{Context, Result};
use std::net::{TcpListener, TcpStream};
use tracing::{error, info};
use xfer_channel::{Role, SecureStream};

pub fn run(settings: &Settings) -> Result<()> {
    let listener = TcpListener::bind(&settings.addr)
        .with_context(|| format!("listen error: {}", settings.addr))?;
    info!("listening on {}", listener.local_addr().context("local addr")?);

    loop {
        let (conn, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(err) => {
                error!("accept error: {err}");
                if settings.keep {
                    continue;
                }
                break;
            }
        };
        info!("connection from {peer}");

        if let Err(err) = handle(conn, settings) {
            error!("{err:#}");
        } else {
            info!("connection closed {peer}");
        }

        if !settings.keep {
            break;
        }
    }
    Ok(())
}

fn handle(conn: TcpStream, settings: &Settings) -> Result<()> {
    match settings.secure_config(Role::Responder) {
        Some(config) => {
            let secured = SecureStream::wrap(conn, &config).context("handshake error")?;
            apply_io_timeout(&secured, settings)?;
            relay::run(&secured);
        }
        None => {
            apply_io_timeout(&conn, settings)?;
            relay::run(&conn);
        }
    }
    Ok(())
}
