//! Live Sync Channel
//!
//! Maintains a resilient duplex connection to one session endpoint: forwards
//! the local participant's location, delivers the remote roster to an
//! observer, keeps the connection warm with a liveness probe, and reconnects
//! on its own after qualifying closures. All channel state and both timers
//! live in a single driver task; handles talk to it through a command
//! channel, so nothing here needs locking.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep};

use crate::domain::{epoch_millis, ParticipantId, ResolvedLocation};
use crate::shared::TransportError;

use super::messages::{ClientMessage, ServerMessage};
use super::state::ChannelState;
use super::transport::{Connector, Transport, TransportEvent, NORMAL_CLOSURE_CODE};

/// Liveness probe period while the channel is open. The probe only keeps
/// intermediaries from expiring an idle connection; an unanswered probe is
/// not treated as a failure.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// Delay between a qualifying closure and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Roster observer: receives the other participants' locations, local
/// participant already excluded, order preserved.
pub type RosterObserver = dyn FnMut(Vec<ResolvedLocation>) + Send;

#[derive(Debug)]
enum Command {
    SendLocation {
        latitude: f64,
        longitude: f64,
        heading: f64,
    },
    Close,
}

/// Handle to a live sync channel. One handle per sharing session; dropping
/// it closes the channel.
#[derive(Debug)]
pub struct SyncChannel {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ChannelState>,
}

impl SyncChannel {
    /// Begin connecting immediately. `initial_location` is announced to the
    /// server as soon as the handshake completes (and again after every
    /// reconnect, updated to the most recent coordinates passed to
    /// [`send_location`](Self::send_location)).
    pub fn connect<C, F>(
        connector: C,
        url: String,
        participant: ParticipantId,
        initial_location: ResolvedLocation,
        on_roster: F,
    ) -> Self
    where
        C: Connector,
        F: FnMut(Vec<ResolvedLocation>) + Send + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(ChannelState::Disconnected);

        tokio::spawn(drive(
            connector,
            url,
            participant,
            initial_location,
            Box::new(on_roster),
            command_rx,
            state_tx,
        ));

        Self { commands, state }
    }

    /// Current channel state.
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn state_changes(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Transmit a location update if the channel is open; otherwise the
    /// update is silently dropped (at-most-once, no queue). The coordinates
    /// are still remembered as the participant's current position for the
    /// next reconnect announcement.
    pub fn send_location(&self, latitude: f64, longitude: f64, heading: f64) {
        let _ = self.commands.send(Command::SendLocation {
            latitude,
            longitude,
            heading,
        });
    }

    /// Tear the channel down. Idempotent; safe from any state. Sends a
    /// normal closure, cancels the liveness probe and any pending reconnect,
    /// and prevents all further reconnection.
    pub fn close(&self) {
        // send fails once the driver has already terminated, which is fine
        let _ = self.commands.send(Command::Close);
    }
}

impl Drop for SyncChannel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Driver task: owns the state machine, the transport, and both timers.
async fn drive<C: Connector>(
    connector: C,
    url: String,
    participant: ParticipantId,
    mut current: ResolvedLocation,
    mut on_roster: Box<RosterObserver>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ChannelState>,
) {
    loop {
        state.send_replace(ChannelState::Connecting);
        tracing::debug!(url = %url, "Connecting to session endpoint");

        let connected = {
            let connect = connector.connect(&url);
            tokio::pin!(connect);
            tokio::select! {
                result = &mut connect => Some(result),
                _ = drain_until_close(&mut commands, &mut current) => None,
            }
        };

        let mut transport = match connected {
            // close() while the handshake was in flight
            None => {
                shutdown(&state);
                return;
            }
            Some(Ok(transport)) => transport,
            // A failed handshake counts as a qualifying closure.
            Some(Err(err)) => {
                tracing::warn!(error = %err, "Handshake failed");
                state.send_replace(ChannelState::Disconnected);
                if !wait_for_reconnect(&mut commands, &mut current).await {
                    shutdown(&state);
                    return;
                }
                continue;
            }
        };

        state.send_replace(ChannelState::Open);
        tracing::info!(participant = %participant, "Live sync channel open");

        // Announce the current position so the server includes us in the
        // roster it broadcasts.
        current.timestamp = epoch_millis();
        if let Err(err) = send_message(&mut transport, &ClientMessage::location_update(&current)).await
        {
            tracing::debug!(error = %err, "Initial location announcement failed");
        }

        match serve(&mut transport, &mut commands, &mut current, &participant, &mut on_roster, &state)
            .await
        {
            // Explicit close: the only terminal path we initiate.
            None => {
                transport.close(NORMAL_CLOSURE_CODE, "client closed").await;
                state.send_replace(ChannelState::Disconnected);
                tracing::info!("Live sync channel closed");
                return;
            }
            Some(code) => {
                // The probe timer died with serve's scope; it is never
                // active outside an open connection.
                state.send_replace(ChannelState::Disconnected);
                if code == NORMAL_CLOSURE_CODE {
                    tracing::info!("Server closed the session normally");
                    return;
                }
                tracing::info!(code, delay = ?RECONNECT_DELAY, "Connection lost, scheduling reconnect");
                if !wait_for_reconnect(&mut commands, &mut current).await {
                    shutdown(&state);
                    return;
                }
            }
        }
    }
}

/// Serve one open connection until it closes.
///
/// Returns `Some(code)` when the transport closed, `None` when the local
/// side requested the close.
async fn serve<T: Transport>(
    transport: &mut T,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    current: &mut ResolvedLocation,
    participant: &ParticipantId,
    on_roster: &mut Box<RosterObserver>,
    state: &watch::Sender<ChannelState>,
) -> Option<u16> {
    let mut probe = interval(PROBE_INTERVAL);
    // Skip the immediate tick; the first probe fires one period after open.
    probe.tick().await;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::SendLocation { latitude, longitude, heading }) => {
                    record_current(current, latitude, longitude, heading);
                    if let Err(err) =
                        send_message(transport, &ClientMessage::location_update(current)).await
                    {
                        tracing::debug!(error = %err, "Location update send failed");
                    }
                }
                Some(Command::Close) | None => {
                    state.send_replace(ChannelState::Closing);
                    return None;
                }
            },

            _ = probe.tick() => {
                let ping = ClientMessage::Ping { timestamp: epoch_millis() };
                if let Err(err) = send_message(transport, &ping).await {
                    tracing::debug!(error = %err, "Liveness probe send failed");
                }
            }

            event = transport.next_event() => match event {
                TransportEvent::Text(text) => dispatch(&text, participant, on_roster),
                TransportEvent::Closed { code } => return Some(code),
            }
        }
    }
}

/// Handle one inbound frame. Never escalates: unrecognized types are
/// ignored, malformed frames are dropped and logged.
fn dispatch(text: &str, participant: &ParticipantId, on_roster: &mut Box<RosterObserver>) {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::AllLocations { data }) => {
            let roster: Vec<ResolvedLocation> = data
                .into_iter()
                .filter(|location| &location.user_id != participant)
                .collect();
            tracing::trace!(participants = roster.len(), "Roster snapshot received");
            on_roster(roster);
        }
        Ok(ServerMessage::Pong) => {
            tracing::trace!("Liveness probe answered");
        }
        Ok(ServerMessage::Unknown) => {
            tracing::debug!("Ignoring unrecognized message type");
        }
        Err(err) => {
            tracing::debug!(error = %err, "Dropping malformed frame");
        }
    }
}

/// Wait out the reconnect delay. Returns `false` if the channel was closed
/// while waiting, cancelling the pending reconnect.
async fn wait_for_reconnect(
    commands: &mut mpsc::UnboundedReceiver<Command>,
    current: &mut ResolvedLocation,
) -> bool {
    tokio::select! {
        _ = sleep(RECONNECT_DELAY) => true,
        _ = drain_until_close(commands, current) => false,
    }
}

/// Consume commands while the channel is not open. Location updates are
/// dropped without delivery, but the coordinates are recorded so the next
/// reconnect announces the participant's current position. Resolves when an
/// explicit close arrives or every handle has been dropped.
async fn drain_until_close(
    commands: &mut mpsc::UnboundedReceiver<Command>,
    current: &mut ResolvedLocation,
) {
    loop {
        match commands.recv().await {
            Some(Command::SendLocation { latitude, longitude, heading }) => {
                record_current(current, latitude, longitude, heading);
                tracing::debug!("Channel not open, dropping location update");
            }
            Some(Command::Close) | None => return,
        }
    }
}

fn record_current(current: &mut ResolvedLocation, latitude: f64, longitude: f64, heading: f64) {
    current.latitude = latitude;
    current.longitude = longitude;
    current.heading = heading;
    current.timestamp = epoch_millis();
}

async fn send_message<T: Transport + ?Sized>(
    transport: &mut T,
    message: &ClientMessage,
) -> Result<(), TransportError> {
    let text =
        serde_json::to_string(message).map_err(|err| TransportError::Send(err.to_string()))?;
    transport.send_text(text).await
}

/// Terminal transition for explicit closes that happen outside an open
/// connection.
fn shutdown(state: &watch::Sender<ChannelState>) {
    state.send_replace(ChannelState::Closing);
    state.send_replace(ChannelState::Disconnected);
    tracing::info!("Live sync channel closed");
}
