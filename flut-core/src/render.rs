//! Rendering sinks.
//!
//! The session never draws anything itself. It resizes and feeds a
//! [`RenderSink`], which may be a window, an image writer, or the
//! [`WatchSink`] below that publishes frames to other tasks.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::frame::{DecodedFrame, Dimensions};

// ── RenderSink ───────────────────────────────────────────────────

/// Drawing surface fed by the session.
pub trait RenderSink {
    /// The canvas size changed; resize the surface to match.
    fn resize_surface(&mut self, width: u32, height: u32);

    /// Draw a full frame with its top-left corner at `(x, y)`.
    fn draw_frame(&mut self, frame: &DecodedFrame, x: u32, y: u32);
}

impl<S: RenderSink + ?Sized> RenderSink for Box<S> {
    fn resize_surface(&mut self, width: u32, height: u32) {
        (**self).resize_surface(width, height)
    }

    fn draw_frame(&mut self, frame: &DecodedFrame, x: u32, y: u32) {
        (**self).draw_frame(frame, x, y)
    }
}

// ── FrameStats ───────────────────────────────────────────────────

/// Per-frame statistics exposed to the UI.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// Current smoothed frames per second.
    pub fps: f64,
    /// Total frames rendered since start.
    pub total_frames: u64,
    /// Total decoded bytes rendered.
    pub total_bytes: u64,
    /// Current surface width.
    pub width: u32,
    /// Current surface height.
    pub height: u32,
}

/// Number of inter-frame gaps averaged for the fps figure.
const FPS_WINDOW: usize = 60;

// ── WatchSink ────────────────────────────────────────────────────

/// Sink that publishes the latest frame over `tokio::sync::watch`.
///
/// Readers get the newest frame without blocking the session; frames
/// they miss are simply overwritten.
pub struct WatchSink {
    /// Sender half of the frame watch channel.
    frame_tx: watch::Sender<DecodedFrame>,
    /// Receiver half — clone this to get frames elsewhere.
    frame_rx: watch::Receiver<DecodedFrame>,
    /// Stats channel.
    stats_tx: watch::Sender<FrameStats>,
    stats_rx: watch::Receiver<FrameStats>,
    surface: Option<Dimensions>,
    gaps: VecDeque<Duration>,
    last_frame_at: Option<Instant>,
}

impl WatchSink {
    pub fn new() -> Self {
        let (frame_tx, frame_rx) = watch::channel(DecodedFrame::default());
        let (stats_tx, stats_rx) = watch::channel(FrameStats::default());
        Self {
            frame_tx,
            frame_rx,
            stats_tx,
            stats_rx,
            surface: None,
            gaps: VecDeque::with_capacity(FPS_WINDOW),
            last_frame_at: None,
        }
    }

    /// Obtain a `watch::Receiver` that yields the latest frame.
    pub fn frame_receiver(&self) -> watch::Receiver<DecodedFrame> {
        self.frame_rx.clone()
    }

    /// Obtain a `watch::Receiver` for frame statistics.
    pub fn stats_receiver(&self) -> watch::Receiver<FrameStats> {
        self.stats_rx.clone()
    }

    /// Current surface size, if the canvas size is known.
    pub fn surface(&self) -> Option<Dimensions> {
        self.surface
    }

    fn record_frame(&mut self, bytes: usize) -> f64 {
        let now = Instant::now();
        if let Some(last) = self.last_frame_at.replace(now) {
            if self.gaps.len() == FPS_WINDOW {
                self.gaps.pop_front();
            }
            self.gaps.push_back(now.duration_since(last));
        }

        let avg_secs = if self.gaps.is_empty() {
            0.0
        } else {
            self.gaps.iter().map(Duration::as_secs_f64).sum::<f64>() / self.gaps.len() as f64
        };

        self.stats_tx.send_modify(|stats| {
            stats.total_frames += 1;
            stats.total_bytes += bytes as u64;
        });

        if avg_secs > 0.0 { 1.0 / avg_secs } else { 0.0 }
    }
}

impl Default for WatchSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for WatchSink {
    fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface = Some(Dimensions::new(width, height));
        self.stats_tx.send_modify(|stats| {
            stats.width = width;
            stats.height = height;
        });
    }

    fn draw_frame(&mut self, frame: &DecodedFrame, _x: u32, _y: u32) {
        let fps = self.record_frame(frame.data.len());
        self.stats_tx.send_modify(|stats| stats.fps = fps);
        self.frame_tx.send_replace(frame.clone());
    }
}

// ── Tests ────────────────────────────────────────────────────────
