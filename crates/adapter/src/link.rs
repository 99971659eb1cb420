//! The transport seam between the orchestrator and the controller boards.

use crate::protocol::describe_code;
use crate::types::ControllerAddress;

/// Failure of one bus exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transmission to {address} failed: {} (code {code})", describe_code(*.code))]
    Transmission { address: ControllerAddress, code: u8 },

    #[error("no response from {address} within {timeout_ms}ms")]
    Timeout {
        address: ControllerAddress,
        timeout_ms: u64,
    },

    #[error("payload of {len} bytes exceeds the bus buffer")]
    PayloadTooLarge { len: usize },

    #[error("gateway I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gateway unreachable: {0}")]
    Unreachable(String),
}

impl TransportError {
    /// Bus result code equivalent, for relaying over the gateway.
    pub fn code(&self) -> u8 {
        match self {
            TransportError::Transmission { code, .. } => *code,
            TransportError::PayloadTooLarge { .. } => crate::protocol::wire::CODE_TOO_LONG,
            TransportError::Timeout { .. } => 5,
            TransportError::Io(_) | TransportError::Unreachable(_) => {
                crate::protocol::wire::CODE_OTHER
            }
        }
    }
}

/// Byte-oriented request/response access to controllers on the shared bus.
///
/// Implementations talk to one controller at a time; an exchange completes
/// before the call returns.
pub trait ControllerLink {
    /// Transmit `bytes` to `address` as one transmission.
    fn send(&mut self, address: ControllerAddress, bytes: &[u8]) -> Result<(), TransportError>;

    /// Ask `address` for up to `count` bytes.
    ///
    /// Returning fewer than `count` bytes (possibly none) means the controller
    /// had nothing ready; callers decide whether to retry.
    fn request(
        &mut self,
        address: ControllerAddress,
        count: usize,
    ) -> Result<Vec<u8>, TransportError>;
}

impl<T: ControllerLink + ?Sized> ControllerLink for Box<T> {
    fn send(&mut self, address: ControllerAddress, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(address, bytes)
    }

    fn request(
        &mut self,
        address: ControllerAddress,
        count: usize,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).request(address, count)
    }
}

/// Bound on every wait for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before the controller is declared faulted (at least 1).
    pub max_attempts: u32,
    /// Pause between attempts.
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            retry_delay_ms: 100,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Worst-case time spent waiting on one condition.
    pub fn budget_ms(&self) -> u64 {
        self.attempts().saturating_sub(1) as u64 * self.retry_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmission_error_describes_code() {
        let err = TransportError::Transmission {
            address: ControllerAddress(9),
            code: 2,
        };
        assert_eq!(
            err.to_string(),
            "transmission to 0x09 failed: address not acknowledged (code 2)"
        );
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn retry_policy_never_zero_attempts() {
        let p = RetryPolicy {
            max_attempts: 0,
            retry_delay_ms: 50,
        };
        assert_eq!(p.attempts(), 1);
        assert_eq!(p.budget_ms(), 0);
        assert_eq!(RetryPolicy::default().budget_ms(), 1900);
    }
}
