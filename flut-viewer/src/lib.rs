//! # flut-viewer — pixelflut canvas viewer
//!
//! Connects to a pixelflut server over WebSocket, polls full-canvas
//! snapshots through `flut-core`, logs frame statistics and can dump
//! the last frame to disk.

pub mod config;
pub mod snapshot;
