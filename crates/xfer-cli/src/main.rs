//! xfer: a netcat-style TCP relay with an optional encrypted channel.
//!
//! Connect mode pipes stdin/stdout to a remote peer; listen mode accepts a
//! single connection (or keeps accepting with `--keep`). With `--secure` the
//! connection is wrapped in an ephemeral-key encrypted channel, optionally
//! authenticated by a pre-shared secret.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;

mod client;
mod relay;
mod server;

/// Netcat-style TCP relay with optional authenticated encryption.
#[derive(Parser)]
#[command(name = "xfer", version, about, long_about = None)]
struct Cli {
    /// Target to connect to (HOST:PORT); defaults to 127.0.0.1:<port>
    target: Option<String>,

    /// Listen for an incoming connection instead of connecting out
    #[arg(short, long)]
    listen: bool,

    /// Port to listen on or connect to
    #[arg(short, long, default_value_t = 9999)]
    port: u16,

    /// Keep listening after a connection closes
    #[arg(short, long)]
    keep: bool,

    /// I/O timeout in seconds (0 = no timeout)
    #[arg(short, long, default_value_t = 0)]
    timeout: u64,

    /// Encrypt the connection with an ephemeral key exchange
    #[arg(short, long)]
    secure: bool,

    /// Pre-shared secret authenticating the encrypted handshake
    /// (implies --secure)
    #[arg(long, value_name = "SECRET")]
    secret: Option<String>,

    /// Verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Settings shared by connect and listen mode.
pub struct Settings {
    pub addr: String,
    pub keep: bool,
    pub io_timeout: Option<Duration>,
    pub secure: bool,
    pub secret: Option<String>,
}

/// How long a secure handshake may take before the connection is dropped.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

impl Settings {
    fn from_cli(cli: Cli) -> (Self, bool) {
        let addr = if cli.listen {
            format!("0.0.0.0:{}", cli.port)
        } else {
            cli.target
                .unwrap_or_else(|| format!("127.0.0.1:{}", cli.port))
        };

        let settings = Self {
            addr,
            keep: cli.keep,
            io_timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
            secure: cli.secure || cli.secret.is_some(),
            secret: cli.secret,
        };
        (settings, cli.listen)
    }

    /// Secure-channel config for the given role, or `None` in plaintext mode.
    pub fn secure_config(&self, role: xfer_channel::Role) -> Option<xfer_channel::SecureConfig> {
        if !self.secure {
            return None;
        }
        let mut config =
            xfer_channel::SecureConfig::new(role).with_handshake_timeout(HANDSHAKE_TIMEOUT);
        if let Some(secret) = &self.secret {
            config = config.with_pre_shared_secret(secret.as_bytes());
        }
        Some(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    // stdout carries relay payload; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let (settings, listen) = Settings::from_cli(cli);

    let result = if listen {
        server::run(&settings)
    } else {
        client::run(&settings)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_target_defaults_to_loopback_port() {
        let cli = Cli::parse_from(["xfer"]);
        let (settings, listen) = Settings::from_cli(cli);

        assert!(!listen);
        assert_eq!(settings.addr, "127.0.0.1:9999");
        assert!(!settings.secure);
        assert!(settings.io_timeout.is_none());
    }

    #[test]
    fn test_explicit_target_wins() {
        let cli = Cli::parse_from(["xfer", "example.net:4000"]);
        let (settings, _) = Settings::from_cli(cli);

        assert_eq!(settings.addr, "example.net:4000");
    }

    #[test]
    fn test_listen_mode_binds_port() {
        let cli = Cli::parse_from(["xfer", "-l", "-p", "4444", "-k"]);
        let (settings, listen) = Settings::from_cli(cli);

        assert!(listen);
        assert!(settings.keep);
        assert_eq!(settings.addr, "0.0.0.0:4444");
    }

    #[test]
    fn test_secret_implies_secure() {
        let cli = Cli::parse_from(["xfer", "--secret", "my-secret-key"]);
        let (settings, _) = Settings::from_cli(cli);

        assert!(settings.secure);
        assert_eq!(settings.secret.as_deref(), Some("my-secret-key"));
    }

    #[test]
    fn test_timeout_flag() {
        let cli = Cli::parse_from(["xfer", "-t", "30"]);
        let (settings, _) = Settings::from_cli(cli);

        assert_eq!(settings.io_timeout, Some(Duration::from_secs(30)));
    }
}
