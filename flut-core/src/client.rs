//! Async driver for a [`Session`] over the WebSocket transport.
//!
//! The driver is the session's single execution context: transport
//! events, poll ticks and stop requests are all handled in one
//! `tokio::select!` loop, so the session itself needs no locking.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::FlutError;
use crate::render::RenderSink;
use crate::session::{Session, SessionConfig};
use crate::transport::{TransportEvent, WsConnector};

// ── StopHandle ───────────────────────────────────────────────────

/// Cloneable handle that asks a running [`ViewerClient`] to disconnect.
#[derive(Debug, Clone)]
pub struct StopHandle {
    notify: Arc<Notify>,
}

impl StopHandle {
    /// Request a graceful stop. A stop requested before `run` starts is
    /// remembered.
    pub fn stop(&self) {
        self.notify.notify_one();
    }
}

// ── ViewerClient ─────────────────────────────────────────────────

/// Runs a viewer session until its connection closes.
pub struct ViewerClient<S: RenderSink> {
    session: Session<WsConnector, S>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    auto_connect: bool,
    stop: Arc<Notify>,
}

impl<S: RenderSink> ViewerClient<S> {
    /// Create a client that connects as soon as [`run`](Self::run) starts.
    pub fn new(config: SessionConfig, sink: S) -> Result<Self, FlutError> {
        let (connector, events_rx) = WsConnector::new();
        Ok(Self {
            session: Session::new(config, connector, sink)?,
            events_rx,
            auto_connect: true,
            stop: Arc::new(Notify::new()),
        })
    }

    /// With `false`, the caller connects through
    /// [`session_mut`](Self::session_mut) before calling `run`.
    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    pub fn session(&self) -> &Session<WsConnector, S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<WsConnector, S> {
        &mut self.session
    }

    /// A cloneable stop handle.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            notify: Arc::clone(&self.stop),
        }
    }

    /// Drive the session until the transport closes.
    ///
    /// Returns `Ok(())` after a close that followed a successful open,
    /// and [`FlutError::ConnectionFailed`] if the connection never opened.
    pub async fn run(&mut self) -> Result<(), FlutError> {
        if self.auto_connect && !self.session.is_connected() {
            self.session.connect()?;
        }
        if !self.session.is_connected() {
            return Err(FlutError::NotConnected);
        }

        let mut ticker: Option<Interval> = None;
        let mut stopping = false;
        let mut opened = false;

        loop {
            tokio::select! {
                _ = self.stop.notified(), if !stopping => {
                    stopping = true;
                    info!("stop requested");
                    if let Err(e) = self.session.disconnect() {
                        debug!("stop while not connected: {e}");
                    }
                }
                event = self.events_rx.recv() => {
                    let Some(event) = event else {
                        return Err(FlutError::ChannelClosed);
                    };
                    match event {
                        TransportEvent::Open => opened = true,
                        TransportEvent::Close { ref reason } if !opened => {
                            let reason = reason.clone().unwrap_or_else(|| "closed".into());
                            self.session.on_close(Some(&reason));
                            return Err(FlutError::ConnectionFailed {
                                url: self.session.url().to_string(),
                                reason,
                            });
                        }
                        _ => {}
                    }

                    let closed = matches!(event, TransportEvent::Close { .. });
                    self.session.handle_event(event);
                    if closed {
                        return Ok(());
                    }

                    match (self.session.is_polling(), ticker.is_some()) {
                        (true, false) => ticker = Some(poll_timer(self.session.poll_interval())),
                        (false, true) => ticker = None,
                        _ => {}
                    }
                }
                _ = next_tick(&mut ticker), if ticker.is_some() => {
                    self.session.on_tick();
                }
            }
        }
    }
}

/// A repeating timer whose first tick is one period away.
fn poll_timer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ── Tests ────────────────────────────────────────────────────────
