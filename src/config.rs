// ⚙️ Server configuration - environment only, no config files
//
//   OFFSETS_ADDR           bind address        (default 0.0.0.0:3000)
//   OFFSETS_MAX_UPLOAD_MB  upload size limit   (default 25)
//
// Invalid values fall back to the default with a warning.

use std::net::SocketAddr;
use tracing::warn;

pub const ADDR_VAR: &str = "OFFSETS_ADDR";
pub const MAX_UPLOAD_VAR: &str = "OFFSETS_MAX_UPLOAD_MB";

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_UPLOAD_MB: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(raw) = lookup(ADDR_VAR) {
            match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => config.addr = addr,
                Err(e) => warn!(value = %raw, error = %e, "invalid {}, using {}", ADDR_VAR, DEFAULT_ADDR),
            }
        }

        if let Some(raw) = lookup(MAX_UPLOAD_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(mb) if mb > 0 => config.max_upload_bytes = mb * 1024 * 1024,
                _ => warn!(
                    value = %raw,
                    "invalid {}, using {} MB",
                    MAX_UPLOAD_VAR,
                    DEFAULT_MAX_UPLOAD_MB
                ),
            }
        }

        config
    }
}

/// Install the global fmt subscriber: `RUST_LOG` plus the given directives.
pub fn init_logging(default_directives: &[&str]) {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in default_directives {
        match directive.parse::<tracing_subscriber::filter::Directive>() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("ignoring log directive {}: {}", directive, e),
        }
    }

    // try_init: a second call (tests, embedding) is a no-op
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
