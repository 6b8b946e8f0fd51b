//! Domain-specific error types for the flut viewer.
//!
//! All fallible operations return `Result<T, FlutError>`.
//! Server input never panics the client — every rejection is typed.

use thiserror::Error;

/// The canonical error type for the flut viewer.
#[derive(Debug, Error)]
pub enum FlutError {
    // ── Usage Errors ─────────────────────────────────────────────
    /// `connect` was called while a transport handle is still held.
    #[error("client is already connected to {url}")]
    AlreadyConnected { url: String },

    /// `disconnect` was called without an open or opening connection.
    #[error("client is not connected")]
    NotConnected,

    /// A lifecycle transition was requested from the wrong phase.
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    // ── Protocol Errors ──────────────────────────────────────────
    /// The first token of a server message is not a known command.
    #[error("unrecognized server command: {0:?}")]
    UnrecognizedCommand(String),

    /// A state report declared an encoding this client cannot display.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// A `SIZE` report did not carry exactly two non-negative integers.
    #[error("malformed size report: {0:?}")]
    MalformedSize(String),

    /// A `STATE` report was missing its encoding or payload.
    #[error("malformed state report: missing {0}")]
    MalformedState(&'static str),

    // ── Decode Errors ────────────────────────────────────────────
    /// A snapshot payload could not be turned into a frame.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    // ── Transport Errors ─────────────────────────────────────────
    /// The WebSocket layer reported an error.
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The transport closed before it ever opened.
    #[error("could not connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// An mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    // ── Configuration Errors ─────────────────────────────────────
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── DecodeError ───────────────────────────────────────────────────

/// Reasons a snapshot payload is rejected before anything is rendered.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A snapshot arrived before the first `SIZE` report.
    #[error("canvas dimensions are not known yet")]
    UnknownDimensions,

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded byte count does not match `width * height * 4`.
    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// `width * height * 4` does not fit in memory.
    #[error("frame of {width}x{height} is too large")]
    Overflow { width: u32, height: u32 },
}

// ── Convenient From implementations ──────────────────────────────

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for FlutError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        FlutError::ChannelClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = FlutError::AlreadyConnected {
            url: "ws://canvas:1234".into(),
        };
        assert!(e.to_string().contains("ws://canvas:1234"));

        let e = FlutError::from(DecodeError::LengthMismatch {
            expected: 24,
            actual: 20,
        });
        assert!(e.to_string().contains("24"));
        assert!(e.to_string().contains("20"));
    }

    #[test]
    fn closed_channel_maps_to_channel_closed() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<u8>();
        drop(rx);
        let e: FlutError = tx.send(1).unwrap_err().into();
        assert!(matches!(e, FlutError::ChannelClosed));
    }
}
