//! Sync Channel Message Types
//!
//! Application-level framing on top of text frames. Every message carries a
//! `type` discriminator; payloads ride in `data` or `timestamp`.

use serde::{Deserialize, Serialize};

use crate::domain::{ParticipantId, ResolvedLocation};

/// Messages sent to the session server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    LocationUpdate { data: LocationUpdatePayload },
    Ping { timestamp: i64 },
}

impl ClientMessage {
    pub fn location_update(location: &ResolvedLocation) -> Self {
        Self::LocationUpdate {
            data: LocationUpdatePayload::from(location),
        }
    }
}

/// Outbound location payload. The server derives accuracy-independent state
/// from it, so only position, heading, and capture time go on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdatePayload {
    pub user_id: ParticipantId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub heading: f64,
    pub timestamp: i64,
}

impl From<&ResolvedLocation> for LocationUpdatePayload {
    fn from(location: &ResolvedLocation) -> Self {
        Self {
            user_id: location.user_id.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            heading: location.heading,
            timestamp: location.timestamp,
        }
    }
}

/// Messages received from the session server.
///
/// Unknown `type` values deserialize to [`ServerMessage::Unknown`] and are
/// ignored by the dispatcher; frames that fail to parse at all are dropped
/// and logged.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full roster snapshot; replaces any previously delivered roster.
    AllLocations { data: Vec<ResolvedLocation> },
    /// Liveness probe answer; no payload action.
    Pong,
    #[serde(other)]
    Unknown,
}
