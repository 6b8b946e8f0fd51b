//! # flut-core
//!
//! Core library for the flut pixelflut viewer.
//!
//! This crate contains:
//! - **Protocol types**: `ClientRequest`, `Encoding`, `ServerMessage`
//! - **State**: `ConnectionPhase` lifecycle and the flow-controlled `PollScheduler`
//! - **Frame**: `FrameDecoder` for `rgba64` snapshots, `DecodedFrame`, `Dimensions`
//! - **Session**: `Session`, the single-threaded protocol state machine
//! - **Transport**: `Connector` / `TransportHandle` traits and the WebSocket connector
//! - **Render**: `RenderSink` trait and the `WatchSink` frame publisher
//! - **Client**: `ViewerClient`, the async driver that feeds the session
//! - **Error**: `FlutError` — typed, `thiserror`-based error hierarchy

pub mod client;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod render;
pub mod session;
pub mod state;
pub mod transport;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use client::{StopHandle, ViewerClient};
pub use error::{DecodeError, FlutError};
pub use frame::{DecodedFrame, Dimensions, FrameDecoder};
pub use protocol::{ClientRequest, Encoding, ServerMessage};
pub use render::{FrameStats, RenderSink, WatchSink};
pub use session::{MessageOutcome, Session, SessionConfig};
pub use state::{ConnectionPhase, PollScheduler};
pub use transport::{Connector, SUBPROTOCOL, TransportEvent, TransportHandle, WsConnector};
