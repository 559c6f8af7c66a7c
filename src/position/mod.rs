//! Position acquisition: sources, deadline policy, and the acquirer.

pub mod acquirer;
pub mod simulated;

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::LocationSample;
use crate::shared::PositionError;

/// Deadline for a single fix request. A request that exceeds it fails with
/// [`PositionError::Timeout`].
pub const FIX_DEADLINE: Duration = Duration::from_secs(15);

/// A device positioning capability observed in high-accuracy mode.
///
/// Implementations resolve with the next raw fix as soon as one is
/// available; the acquirer supplies the deadline and filtering on top.
#[async_trait]
pub trait PositionSource: Send + 'static {
    async fn next_fix(&mut self) -> Result<LocationSample, PositionError>;
}

pub use acquirer::LocationAcquirer;
pub use simulated::SimulatedPositionSource;
