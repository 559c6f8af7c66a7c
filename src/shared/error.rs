//! Client Error Types
//!
//! One enum per failure domain. Propagation rules differ per component: the
//! acquirer escalates only the very first positioning failure, the sync
//! channel never escalates connectivity failures at all (it retries on its
//! own), and the REST boundary returns errors to the caller.

use std::time::Duration;

/// Failures of the positioning capability.
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("positioning capability is not available")]
    Unavailable,

    #[error("positioning permission denied: {0}")]
    Denied(String),

    #[error("no position fix within {0:?}")]
    Timeout(Duration),

    #[error("position acquisition failed: {0}")]
    Acquisition(String),
}

impl PositionError {
    /// Terminal errors end the watch; the rest are transient and the watch
    /// keeps running.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Unavailable | Self::Denied(_))
    }
}

/// Failures of the live sync transport. Diagnostics only: reconnection is
/// driven by closure, never directly by these.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    #[error("websocket send failed: {0}")]
    Send(String),
}

/// Failures of the session REST boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Top-level error for client wiring and startup.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("identity store error: {0}")]
    Identity(#[from] std::io::Error),
}
