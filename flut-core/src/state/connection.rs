//! Where the viewer's single transport connection currently stands.
//!
//! Illegal moves come back as errors so the session can refuse a call
//! without corrupting its own bookkeeping.

use std::time::{Duration, Instant};

use crate::error::FlutError;

// ── ConnectionPhase ──────────────────────────────────────────────

/// Lifecycle of one viewer connection.
///
/// ```text
///  Disconnected ──► Connecting ──► Connected
///       ▲               │              │
///       │               ▼              ▼
///       └────────── Disconnecting ◄────┘
/// ```
///
/// Any transport close jumps straight back to `Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,

    /// The socket task is dialing; no open event yet.
    Connecting,

    /// Open event received. Snapshot polling only runs here.
    Connected { since: Instant },

    /// The caller asked to close and the transport has not confirmed.
    Disconnecting,
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected { .. } => "Connected",
            Self::Disconnecting => "Disconnecting",
        };
        f.write_str(name)
    }
}

impl ConnectionPhase {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }

    /// Time spent open, or `None` while not `Connected`.
    pub fn uptime(&self) -> Option<Duration> {
        match self {
            Self::Connected { since } => Some(since.elapsed()),
            _ => None,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// `Disconnected` → `Connecting`.
    pub fn begin_connect(&mut self) -> Result<(), FlutError> {
        if !self.is_disconnected() {
            return Err(FlutError::InvalidTransition(
                "connect requires a disconnected session",
            ));
        }
        *self = Self::Connecting;
        Ok(())
    }

    /// `Connecting` → `Connected`, stamping the open time.
    pub fn complete_open(&mut self) -> Result<(), FlutError> {
        if *self != Self::Connecting {
            return Err(FlutError::InvalidTransition(
                "open event outside of Connecting",
            ));
        }
        *self = Self::Connected {
            since: Instant::now(),
        };
        Ok(())
    }

    /// `Connecting` or `Connected` → `Disconnecting`. Anything else has
    /// no connection left to close.
    pub fn begin_disconnect(&mut self) -> Result<(), FlutError> {
        match self {
            Self::Connecting | Self::Connected { .. } => {
                *self = Self::Disconnecting;
                Ok(())
            }
            Self::Disconnected | Self::Disconnecting => Err(FlutError::NotConnected),
        }
    }

    /// Back to `Disconnected` unconditionally; the transport is gone.
    pub fn force_disconnect(&mut self) {
        *self = Self::Disconnected;
    }
}

// ── Tests ────────────────────────────────────────────────────────
