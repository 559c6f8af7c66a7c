//! Live sync channel: messages, transport abstraction, and the resilient
//! duplex connection to the session server.

pub mod channel;
pub mod messages;
pub mod state;
pub mod transport;

pub use channel::{SyncChannel, PROBE_INTERVAL, RECONNECT_DELAY};
pub use state::ChannelState;
pub use transport::{Connector, Transport, TransportEvent, WsConnector, NORMAL_CLOSURE_CODE};
