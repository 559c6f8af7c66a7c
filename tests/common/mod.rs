//! Common Test Utilities
//!
//! Scripted position sources and transports so acquirer and channel behavior
//! can be driven deterministically under paused time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use locshare::domain::{LocationSample, ResolvedLocation};
use locshare::position::PositionSource;
use locshare::shared::{PositionError, TransportError};
use locshare::sync::{Connector, Transport, TransportEvent};

/// One scripted fix: the result delivered after `delay`.
pub struct ScriptedFix {
    pub delay: Duration,
    pub result: Result<LocationSample, PositionError>,
}

/// Position source that serves a script in order, then pends forever like a
/// watch with no further movement.
pub struct ScriptedSource {
    script: VecDeque<ScriptedFix>,
}

impl ScriptedSource {
    pub fn new(script: Vec<ScriptedFix>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Script where every fix resolves immediately.
    pub fn immediate(results: Vec<Result<LocationSample, PositionError>>) -> Self {
        Self::new(
            results
                .into_iter()
                .map(|result| ScriptedFix {
                    delay: Duration::ZERO,
                    result,
                })
                .collect(),
        )
    }
}

#[async_trait]
impl PositionSource for ScriptedSource {
    async fn next_fix(&mut self) -> Result<LocationSample, PositionError> {
        match self.script.pop_front() {
            Some(fix) => {
                tokio::time::sleep(fix.delay).await;
                fix.result
            }
            None => futures::future::pending().await,
        }
    }
}

pub fn sample(latitude: f64, longitude: f64, accuracy: f64) -> LocationSample {
    LocationSample {
        latitude,
        longitude,
        accuracy,
        heading: None,
        timestamp: 1,
    }
}

/// Test-side handle to one established fake connection.
#[derive(Clone)]
pub struct TransportHandle {
    events: mpsc::UnboundedSender<TransportEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<Option<(u16, String)>>>,
}

impl TransportHandle {
    /// Deliver an inbound text frame.
    pub fn push_text(&self, text: &str) {
        self.events
            .send(TransportEvent::Text(text.to_owned()))
            .unwrap();
    }

    /// Close the connection from the server side.
    pub fn push_close(&self, code: u16) {
        self.events.send(TransportEvent::Closed { code }).unwrap();
    }

    /// Everything the channel transmitted on this connection.
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Everything transmitted, parsed as JSON.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    /// The close frame the channel sent, if any.
    pub fn close_frame(&self) -> Option<(u16, String)> {
        self.closed.lock().clone()
    }
}

pub struct FakeTransport {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<Option<(u16, String)>>>,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sent.lock().push(text);
        Ok(())
    }

    async fn next_event(&mut self) -> TransportEvent {
        match self.events.recv().await {
            Some(event) => event,
            // Handle dropped: behave like a quiet connection.
            None => futures::future::pending().await,
        }
    }

    async fn close(&mut self, code: u16, reason: &str) {
        *self.closed.lock() = Some((code, reason.to_owned()));
    }
}

/// What one connection attempt should do.
pub enum ConnectOutcome {
    /// Handshake succeeds; the test gets a [`TransportHandle`].
    Success,
    /// Handshake fails.
    Failure,
    /// Handshake never completes.
    Hang,
}

/// Connector serving scripted outcomes per attempt; attempts beyond the
/// script succeed.
#[derive(Clone)]
pub struct FakeConnector {
    outcomes: Arc<Mutex<VecDeque<ConnectOutcome>>>,
    attempts: Arc<AtomicUsize>,
    handles: Arc<Mutex<Vec<TransportHandle>>>,
}

impl FakeConnector {
    pub fn new(outcomes: Vec<ConnectOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            attempts: Arc::new(AtomicUsize::new(0)),
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always_succeeding() -> Self {
        Self::new(Vec::new())
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Handle to the n-th established connection.
    pub fn handle(&self, index: usize) -> TransportHandle {
        self.handles.lock()[index].clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Transport = FakeTransport;

    async fn connect(&self, _url: &str) -> Result<FakeTransport, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .outcomes
            .lock()
            .pop_front()
            .unwrap_or(ConnectOutcome::Success);
        match outcome {
            ConnectOutcome::Failure => {
                Err(TransportError::Handshake("scripted failure".into()))
            }
            ConnectOutcome::Hang => futures::future::pending().await,
            ConnectOutcome::Success => {
                let (events_tx, events_rx) = mpsc::unbounded_channel();
                let sent = Arc::new(Mutex::new(Vec::new()));
                let closed = Arc::new(Mutex::new(None));
                self.handles.lock().push(TransportHandle {
                    events: events_tx,
                    sent: sent.clone(),
                    closed: closed.clone(),
                });
                Ok(FakeTransport {
                    events: events_rx,
                    sent,
                    closed,
                })
            }
        }
    }
}

/// Roster observer capturing every delivered snapshot.
pub fn roster_recorder() -> (
    impl FnMut(Vec<ResolvedLocation>) + Send + 'static,
    mpsc::UnboundedReceiver<Vec<ResolvedLocation>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        move |roster| {
            let _ = tx.send(roster);
        },
        rx,
    )
}
