//! Accuracy-Gated Location Filter
//!
//! Consumer-grade positioning hardware tends to report very coarse fixes
//! right after activation. The filter drops those so markers do not jump
//! around, but accepts the fifth consecutive poor fix anyway so the stream
//! never goes silent indoors, where accuracy may never improve. Accepted
//! fixes are blended with the previous one to smooth residual jitter.

use super::identity::ParticipantId;
use super::location::{LocationSample, ResolvedLocation};

/// Fixes with worse (numerically larger) accuracy than this are rejected.
pub const ACCURACY_THRESHOLD_METERS: f64 = 200.0;

/// Rejections in a row before a poor fix is accepted regardless of accuracy.
/// With a limit of 4, the fifth consecutive poor fix always passes.
pub const MAX_CONSECUTIVE_REJECTS: u32 = 4;

/// Weight of the current sample in the exponential blend; the last accepted
/// location contributes the remainder.
pub const BLEND_WEIGHT: f64 = 0.7;

/// Converts raw samples into a low-jitter stream of resolved locations for
/// one local participant.
#[derive(Debug)]
pub struct LocationFilter {
    owner: ParticipantId,
    last_accepted: Option<ResolvedLocation>,
    rejected_in_a_row: u32,
}

impl LocationFilter {
    pub fn new(owner: ParticipantId) -> Self {
        Self {
            owner,
            last_accepted: None,
            rejected_in_a_row: 0,
        }
    }

    /// Apply the gate and blend to one sample.
    ///
    /// Returns `None` when the sample is rejected; the caller must not emit
    /// anything in that case.
    pub fn apply(&mut self, sample: LocationSample) -> Option<ResolvedLocation> {
        if sample.accuracy > ACCURACY_THRESHOLD_METERS
            && self.rejected_in_a_row < MAX_CONSECUTIVE_REJECTS
        {
            self.rejected_in_a_row += 1;
            tracing::debug!(
                accuracy = sample.accuracy,
                rejected = self.rejected_in_a_row,
                "Dropping low-accuracy fix"
            );
            return None;
        }

        // Latitude and longitude are blended; heading and accuracy always
        // come from the current sample.
        let (latitude, longitude) = match &self.last_accepted {
            Some(prev) => (
                sample.latitude * BLEND_WEIGHT + prev.latitude * (1.0 - BLEND_WEIGHT),
                sample.longitude * BLEND_WEIGHT + prev.longitude * (1.0 - BLEND_WEIGHT),
            ),
            None => (sample.latitude, sample.longitude),
        };

        let resolved = ResolvedLocation {
            user_id: self.owner.clone(),
            latitude,
            longitude,
            heading: sample.heading.unwrap_or(0.0),
            timestamp: sample.timestamp,
            accuracy: sample.accuracy,
        };

        self.rejected_in_a_row = 0;
        self.last_accepted = Some(resolved.clone());
        Some(resolved)
    }
}
