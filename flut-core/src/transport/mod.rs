//! Transport seam between the session and the network.
//!
//! The session only sees a [`Connector`] that opens connections and a
//! [`TransportHandle`] that sends text and requests a close. Lifecycle
//! and inbound messages come back as [`TransportEvent`]s, delivered by
//! whoever drives the session (see [`ViewerClient`](crate::client::ViewerClient)).

pub mod ws;

pub use ws::{WsConnector, WsHandle};

use crate::error::FlutError;

/// Subprotocol token declared when opening the connection.
pub const SUBPROTOCOL: &str = "pixelflut";

/// Opens transport connections.
pub trait Connector {
    type Handle: TransportHandle;

    /// Start opening a connection. Returns as soon as the attempt is
    /// underway; completion is reported as [`TransportEvent::Open`] or
    /// [`TransportEvent::Close`].
    fn open(&mut self, url: &str, subprotocol: &str) -> Result<Self::Handle, FlutError>;
}

/// An owned, open (or opening) connection.
pub trait TransportHandle {
    /// Queue one text message.
    fn send(&mut self, text: &str) -> Result<(), FlutError>;

    /// Request a close. The close completes with [`TransportEvent::Close`].
    fn close(&mut self);
}

/// Events a transport reports back to the session, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is open and ready for traffic.
    Open,
    /// One inbound text message.
    Message(String),
    /// The connection is gone. Always the last event for a connection.
    Close { reason: Option<String> },
}
