//! Sharing Sessions
//!
//! Server-assigned correlation id grouping participants, and the share link
//! carrying it.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long the server keeps a session alive. Informational only, enforced
/// entirely server-side.
pub const SESSION_VALIDITY: Duration = Duration::from_secs(24 * 60 * 60);

/// Query parameter carrying the session id in a share link.
const SESSION_PARAM: &str = "session";

/// Opaque session identifier assigned by the session server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the shareable link other participants open to join.
    pub fn share_link(&self, origin: &str, path: &str) -> String {
        format!("{}{}?{}={}", origin, path, SESSION_PARAM, self.0)
    }

    /// Extract a session id from a share link, if it carries one.
    pub fn from_share_link(link: &str) -> Option<Self> {
        let (_, query) = link.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == SESSION_PARAM)
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
            .map(|id| Self(id.to_owned()))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
