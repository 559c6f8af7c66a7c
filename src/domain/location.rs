//! Location Records
//!
//! Raw position fixes and the filtered, wire-shaped resolved location.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::identity::ParticipantId;

/// Raw fix from a positioning source, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSample {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Estimated accuracy in meters (lower is better)
    pub accuracy: f64,

    /// Heading in degrees, if the device reports one
    pub heading: Option<f64>,

    /// Capture time, epoch milliseconds
    pub timestamp: i64,
}

/// Filtered, ready-to-share position of one participant.
///
/// Replaced wholesale on every update, never mutated in place. The serde
/// field names are the session server's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub user_id: ParticipantId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub heading: f64,
    pub timestamp: i64,
    /// Accuracy of the source sample in meters. Servers that predate this
    /// field omit it, hence the default.
    #[serde(default)]
    pub accuracy: f64,
}

/// Current time as epoch milliseconds, the timestamp unit of the wire format.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
