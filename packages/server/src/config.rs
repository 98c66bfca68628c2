//! Server configuration.
//!
//! Every option can be given as a command-line flag or a `HIROBA_*`
//! environment variable. Flags take precedence.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Parser;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },

    #[error("Public upload base must be a path below '/' (got '{0}')")]
    InvalidUploadBase(String),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "hiroba-server")]
#[command(about = "Real-time chat rooms over WebSocket")]
#[command(version)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "HIROBA_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "HIROBA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Directory uploaded images are written to
    #[arg(long, env = "HIROBA_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// URL path uploaded images are served under
    #[arg(long, env = "HIROBA_PUBLIC_UPLOAD_BASE", default_value = "/uploads")]
    pub public_upload_base: String,

    /// Frames buffered per connection before new frames are dropped
    #[arg(long, env = "HIROBA_OUTBOUND_QUEUE_CAPACITY", default_value_t = 256)]
    pub outbound_queue_capacity: usize,

    /// Per-frame socket write timeout in milliseconds
    #[arg(long, env = "HIROBA_SEND_TIMEOUT_MS", default_value_t = 5_000)]
    pub send_timeout_ms: u64,

    /// Largest accepted upload in bytes
    #[arg(long, env = "HIROBA_MAX_UPLOAD_BYTES", default_value_t = 5 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            upload_dir: PathBuf::from("uploads"),
            public_upload_base: "/uploads".to_string(),
            outbound_queue_capacity: 256,
            send_timeout_ms: 5_000,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Check cross-field constraints clap cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.outbound_queue_capacity == 0 {
            return Err(ConfigError::NotPositive {
                name: "outbound_queue_capacity",
            });
        }
        if self.send_timeout_ms == 0 {
            return Err(ConfigError::NotPositive {
                name: "send_timeout_ms",
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::NotPositive {
                name: "max_upload_bytes",
            });
        }
        let base = self.public_upload_base.trim_end_matches('/');
        if base.is_empty() || !base.starts_with('/') || base.starts_with("//") {
            return Err(ConfigError::InvalidUploadBase(
                self.public_upload_base.clone(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Route path the upload directory is mounted at
    pub fn upload_route(&self) -> String {
        self.public_upload_base.trim_end_matches('/').to_string()
    }
}
