//! Transport Abstraction
//!
//! The channel's state machine is written against these traits; the real
//! endpoint is a tokio-tungstenite WebSocket. Tests substitute scripted
//! transports.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::shared::TransportError;

/// The canonical "normal closure" close code. A closure carrying it never
/// triggers reconnection.
pub const NORMAL_CLOSURE_CODE: u16 = 1000;

/// Close code reported when the peer vanished without a close frame.
pub const ABNORMAL_CLOSURE_CODE: u16 = 1006;

/// Close code reported when a close frame carried no status.
const NO_STATUS_CODE: u16 = 1005;

/// Event surfaced by a transport. `Closed` is final: no further events
/// follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete inbound text frame.
    Text(String),
    /// The connection closed, with the close code if the peer sent one.
    Closed { code: u16 },
}

/// One established duplex connection.
#[async_trait]
pub trait Transport: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Next inbound event. Resolves with `Closed` exactly once, after which
    /// the transport must not be polled again.
    async fn next_event(&mut self) -> TransportEvent;

    /// Initiate a closing handshake with the given code.
    async fn close(&mut self, code: u16, reason: &str);
}

/// Factory for transports, one per connection attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    async fn connect(&self, url: &str) -> Result<Self::Transport, TransportError>;
}

/// Connector for `ws(s)://<host>/ws/{sessionId}` endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

pub struct WsTransport {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: &str) -> Result<WsTransport, TransportError> {
        let (inner, _response) = connect_async(url)
            .await
            .map_err(|err| TransportError::Handshake(err.to_string()))?;
        Ok(WsTransport { inner })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(text))
            .await
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Text(text),
                Some(Ok(Message::Close(frame))) => {
                    let code = frame
                        .map(|f| u16::from(f.code))
                        .unwrap_or(NO_STATUS_CODE);
                    return TransportEvent::Closed { code };
                }
                // Pings are answered by tungstenite itself; binary frames are
                // not part of the protocol.
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    // Errors are diagnostics; the closure that follows them
                    // drives recovery.
                    tracing::debug!(error = %err, "WebSocket read error");
                    return TransportEvent::Closed {
                        code: ABNORMAL_CLOSURE_CODE,
                    };
                }
                None => {
                    return TransportEvent::Closed {
                        code: ABNORMAL_CLOSURE_CODE,
                    }
                }
            }
        }
    }

    async fn close(&mut self, code: u16, reason: &str) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_owned().into(),
        };
        if let Err(err) = self.inner.close(Some(frame)).await {
            tracing::debug!(error = %err, "WebSocket close failed");
        }
    }
}
