//! Simulated Position Source
//!
//! Random walk around a starting point, with coarse accuracy on the first
//! fixes the way consumer hardware behaves right after activation. Used by
//! the headless binary and handy for exercising the filter end to end.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::{epoch_millis, LocationSample};
use crate::shared::PositionError;

use super::PositionSource;

/// Accuracy reported for the warm-up fixes, worst first.
const WARMUP_ACCURACY: [f64; 3] = [500.0, 350.0, 220.0];

/// Accuracy reported once warmed up.
const SETTLED_ACCURACY: f64 = 20.0;

#[derive(Debug)]
pub struct SimulatedPositionSource {
    latitude: f64,
    longitude: f64,
    interval: Duration,
    fixes_served: usize,
}

impl SimulatedPositionSource {
    pub fn new(latitude: f64, longitude: f64, interval: Duration) -> Self {
        Self {
            latitude,
            longitude,
            interval,
            fixes_served: 0,
        }
    }
}

#[async_trait]
impl PositionSource for SimulatedPositionSource {
    async fn next_fix(&mut self) -> Result<LocationSample, PositionError> {
        tokio::time::sleep(self.interval).await;

        let mut rng = rand::rng();
        // Roughly a few meters of drift per fix.
        self.latitude += rng.random_range(-0.00005..0.00005);
        self.longitude += rng.random_range(-0.00005..0.00005);

        let accuracy = WARMUP_ACCURACY
            .get(self.fixes_served)
            .copied()
            .unwrap_or(SETTLED_ACCURACY);
        self.fixes_served += 1;

        Ok(LocationSample {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy,
            heading: Some(rng.random_range(0.0..360.0)),
            timestamp: epoch_millis(),
        })
    }
}
