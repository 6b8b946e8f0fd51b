//! WebSocket transport over `tokio-tungstenite`.
//!
//! Each [`WsConnector::open`] spawns one socket task. The task owns the
//! stream and talks to the rest of the client only through channels:
//! outbound text goes in through the [`WsHandle`], lifecycle and
//! inbound text come out as [`TransportEvent`]s. The task always ends
//! by emitting exactly one `Close`.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tracing::{debug, info, warn};

use crate::error::FlutError;
use crate::transport::{Connector, TransportEvent, TransportHandle};

/// How long to wait for the server to acknowledge a client close.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

// ── WsConnector ──────────────────────────────────────────────────

/// Opens WebSocket connections and reports their events on one channel.
#[derive(Debug, Clone)]
pub struct WsConnector {
    events_tx: mpsc::UnboundedSender<TransportEvent>,
}

impl WsConnector {
    /// Create a connector and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (Self { events_tx }, events_rx)
    }
}

impl Connector for WsConnector {
    type Handle = WsHandle;

    fn open(&mut self, url: &str, subprotocol: &str) -> Result<WsHandle, FlutError> {
        let mut request = url.into_client_request()?;
        let protocol = HeaderValue::from_str(subprotocol)
            .map_err(|e| FlutError::InvalidConfig(format!("subprotocol {subprotocol:?}: {e}")))?;
        request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, protocol);

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FlutError::Other(format!("no tokio runtime for transport: {e}")))?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let events_tx = self.events_tx.clone();
        runtime.spawn(run_socket(request, outbound_rx, events_tx));

        Ok(WsHandle {
            outbound: outbound_tx,
        })
    }
}

// ── WsHandle ─────────────────────────────────────────────────────

/// Handle to one socket task.
#[derive(Debug)]
pub struct WsHandle {
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl TransportHandle for WsHandle {
    fn send(&mut self, text: &str) -> Result<(), FlutError> {
        self.outbound.send(Outbound::Text(text.to_owned()))?;
        Ok(())
    }

    fn close(&mut self) {
        // A closed channel means the task already finished and its
        // `Close` event is on the way.
        let _ = self.outbound.send(Outbound::Close);
    }
}

// ── Socket task ──────────────────────────────────────────────────

async fn run_socket(
    request: Request,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let uri = request.uri().to_string();
    let reason = match drive(request, &mut outbound, &events).await {
        Ok(reason) => reason,
        Err(e) => {
            warn!("connection to {uri} failed: {e}");
            Some(e.to_string())
        }
    };
    info!("connection to {uri} closed");
    let _ = events.send(TransportEvent::Close { reason });
}

async fn drive(
    request: Request,
    outbound: &mut mpsc::UnboundedReceiver<Outbound>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> Result<Option<String>, FlutError> {
    let (ws, _response) = connect_async(request).await?;
    events.send(TransportEvent::Open)?;

    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            cmd = outbound.recv() => match cmd {
                Some(Outbound::Text(text)) => {
                    debug!("→ {text}");
                    write.send(Message::Text(text.into())).await?;
                }
                Some(Outbound::Close) | None => {
                    write.send(Message::Close(None)).await?;
                    // Wait for the server's close frame; anything else
                    // that arrives now belongs to a finished session.
                    let drain = async {
                        while let Some(Ok(msg)) = read.next().await {
                            if msg.is_close() {
                                break;
                            }
                        }
                    };
                    if tokio::time::timeout(CLOSE_GRACE, drain).await.is_err() {
                        debug!("server did not acknowledge close within {CLOSE_GRACE:?}");
                    }
                    return Ok(Some("closed by client".into()));
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    debug!("← {} bytes", text.len());
                    events.send(TransportEvent::Message(text.as_str().to_owned()))?;
                }
                Some(Ok(Message::Close(frame))) => {
                    return Ok(frame.map(|f| f.reason.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!("ignoring {} byte binary message", data.len());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            },
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
