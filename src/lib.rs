//! # Locshare Client
//!
//! Headless client for real-time location sharing:
//!
//! - Acquires noisy position fixes and filters them into a single low-jitter
//!   "current location" for the local participant
//! - Maintains a resilient duplex channel to a session server (connect,
//!   liveness probe, autonomous reconnect) and delivers the live roster of
//!   other participants
//!
//! The session/broadcast server itself is an external collaborator, reached
//! through a small REST boundary (`/api/session`, `/api/location`) and the
//! per-session WebSocket endpoint (`/ws/{sessionId}`).
//!
//! ## Module Structure
//!
//! ```text
//! locshare/
//! +-- config/    Configuration management
//! +-- domain/    Location records, identity, sessions, filtering policy
//! +-- position/  Position sources and the location acquirer
//! +-- sync/      Live sync channel (messages, transport, state machine)
//! +-- api/       Session REST client
//! +-- shared/    Common utilities (errors)
//! ```

// Configuration module
pub mod config;

// Domain layer - core types and filtering
pub mod domain;

// Position acquisition
pub mod position;

// Live sync channel
pub mod sync;

// Session REST boundary
pub mod api;

// Shared utilities
pub mod shared;

// Client wiring
pub mod startup;

// Telemetry and observability
pub mod telemetry;
