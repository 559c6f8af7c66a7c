//! Shared utilities: error taxonomy.

pub mod error;

pub use error::{ApiError, ClientError, PositionError, TransportError};
