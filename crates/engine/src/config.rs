//! Console configuration from environment variables.

use std::net::{SocketAddr, ToSocketAddrs};

use crate::adapter::RetryPolicy;
use crate::coordinator::CoordinatorSettings;
use crate::types::{BUS_POLL_MS, TIMER_POLL_MS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid CONSOLE_GATEWAY '{value}': expected host:port")]
    InvalidGateway { value: String },
}

/// Where the controllers live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkConfig {
    /// In-process simulated boards.
    Simulated,
    /// A bus gateway reachable over TCP.
    Gateway(SocketAddr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub link: LinkConfig,
    pub retry: RetryPolicy,
    pub io_timeout_ms: u64,
    pub bus_poll_ms: u64,
    pub timer_poll_ms: u64,
    /// JSON-lines match journal.
    pub result_log_path: Option<String>,
    /// Tracing output file.
    pub log_path: Option<String>,
    pub seed: Option<u32>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::Simulated,
            retry: RetryPolicy::default(),
            io_timeout_ms: 250,
            bus_poll_ms: BUS_POLL_MS,
            timer_poll_ms: TIMER_POLL_MS,
            result_log_path: None,
            log_path: None,
            seed: None,
        }
    }
}

impl ConsoleConfig {
    /// Create from `CONSOLE_*` environment variables.
    ///
    /// Unparseable numbers fall back to defaults; a malformed gateway address
    /// is an error since silently running against simulated boards would hide it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let text = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let link = match text("CONSOLE_GATEWAY") {
            Some(value) => {
                // Host names resolve once, at startup.
                let resolved = value.to_socket_addrs().ok().and_then(|mut addrs| addrs.next());
                match resolved {
                    Some(addr) => LinkConfig::Gateway(addr),
                    None => return Err(ConfigError::InvalidGateway { value }),
                }
            }
            None => LinkConfig::Simulated,
        };

        let retry = RetryPolicy {
            max_attempts: number("CONSOLE_RETRY_ATTEMPTS")
                .map(|n| n.clamp(1, u32::MAX as u64) as u32)
                .unwrap_or(defaults.retry.max_attempts),
            retry_delay_ms: number("CONSOLE_RETRY_DELAY_MS")
                .unwrap_or(defaults.retry.retry_delay_ms),
        };

        Ok(Self {
            link,
            retry,
            io_timeout_ms: number("CONSOLE_IO_TIMEOUT_MS").unwrap_or(defaults.io_timeout_ms),
            bus_poll_ms: number("CONSOLE_BUS_POLL_MS").unwrap_or(defaults.bus_poll_ms),
            timer_poll_ms: number("CONSOLE_TIMER_POLL_MS").unwrap_or(defaults.timer_poll_ms),
            result_log_path: text("CONSOLE_RESULT_LOG"),
            log_path: text("CONSOLE_LOG_PATH"),
            seed: number("CONSOLE_SEED").map(|n| n as u32),
        })
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            retry: self.retry,
            bus_poll_ms: self.bus_poll_ms,
            timer_poll_ms: self.timer_poll_ms,
        }
    }
}
