//! Configuration module - environment variable parsing and deployment hosts

use std::env;
use std::net::SocketAddr;

/// Relay server configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS; empty means any origin
    pub client_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8001".to_string())
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            client_origins: env::var("CLIENT_ORIGIN")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Where the browser client was served from, which decides the relay it talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Static hosting with the relay on Heroku
    GithubPages,
    /// Local development: page on :8000, relay on :8001
    Local,
}

impl Deployment {
    pub fn from_host(host: &str) -> Result<Self, ConfigError> {
        match host {
            "eysan.github.io" => Ok(Self::GithubPages),
            "localhost:8000" => Ok(Self::Local),
            other => Err(ConfigError::UnsupportedHost(other.to_string())),
        }
    }

    pub fn relay_url(self) -> &'static str {
        match self {
            Self::GithubPages => "wss://wsdemo-eysa.herokuapp.com/",
            Self::Local => "ws://localhost:8001/",
        }
    }
}

/// Relay endpoint for a page host; unknown hosts are fatal before connecting
pub fn relay_endpoint(host: &str) -> Result<&'static str, ConfigError> {
    Deployment::from_host(host).map(Deployment::relay_url)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Unsupported host: {0}")]
    UnsupportedHost(String),
}
