//! Domain layer - core location-sharing types and the filtering policy.

pub mod filter;
pub mod identity;
pub mod location;
pub mod session;

pub use filter::LocationFilter;
pub use identity::{IdentityStore, ParticipantId};
pub use location::{epoch_millis, LocationSample, ResolvedLocation};
pub use session::SessionId;
