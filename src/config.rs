use std::env;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub serial_port: String,
    pub baud_rate: u32,
    pub listen_addr: SocketAddr,
    pub demo_mode: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    /// Read settings from the process environment, after loading `.env` if
    /// one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is fine; real env vars still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let serial_port = lookup("SERIAL_PORT").unwrap_or_else(|| default_serial_port().to_string());

        let baud_rate = match lookup("BAUD_RATE") {
            Some(value) => value.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "BAUD_RATE",
                reason: e.to_string(),
                value,
            })?,
            None => default_baud_rate(),
        };

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(value) => value.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                name: "LISTEN_ADDR",
                reason: e.to_string(),
                value,
            })?,
            None => default_listen_addr(),
        };

        let demo_mode = match lookup("DEMO_MODE") {
            Some(value) => parse_flag(&value).ok_or_else(|| ConfigError::Invalid {
                name: "DEMO_MODE",
                reason: "expected true/false".to_string(),
                value,
            })?,
            None => false,
        };

        Ok(Config {
            serial_port,
            baud_rate,
            listen_addr,
            demo_mode,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

// Default value functions
fn default_serial_port() -> &'static str {
    "/dev/ttyACM0"
}
fn default_baud_rate() -> u32 {
    9600
}
fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4000))
}
