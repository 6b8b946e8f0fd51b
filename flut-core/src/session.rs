//! The viewer session: connection lifecycle, polling and message routing.
//!
//! A [`Session`] is a plain state machine. It never blocks and never
//! spawns; whoever owns it feeds it transport events and timer ticks
//! from a single execution context:
//!
//! ```text
//! connect() ──► Connector::open ─┐
//!                                ▼
//! on_open()    ── SIZE ────────► transport ──► SIZE w h ──► on_message() ──► sink.resize_surface
//! on_tick()    ── STATE rgba64 ► transport ──► STATE … ───► on_message() ──► FrameDecoder ──► sink.draw_frame
//! on_close()   ── timer cancelled, dimensions unknown, poll flag cleared
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::FlutError;
use crate::frame::{Dimensions, FrameDecoder};
use crate::protocol::{ClientRequest, Encoding, ServerMessage};
use crate::render::RenderSink;
use crate::state::{ConnectionPhase, DEFAULT_UPDATE_FREQUENCY, PollScheduler};
use crate::transport::{Connector, SUBPROTOCOL, TransportEvent, TransportHandle};

// ── SessionConfig ────────────────────────────────────────────────

/// Configuration for [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server address, e.g. `ws://localhost:9876`.
    pub url: String,
    /// Snapshot requests per second.
    pub update_frequency: f64,
    /// Give up on an unanswered snapshot request after this long.
    /// `None` waits forever.
    pub snapshot_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            update_frequency: DEFAULT_UPDATE_FREQUENCY,
            snapshot_timeout: None,
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), FlutError> {
        if self.url.is_empty() {
            return Err(FlutError::InvalidConfig("url must not be empty".into()));
        }
        if !self.update_frequency.is_finite() || self.update_frequency <= 0.0 {
            return Err(FlutError::InvalidConfig(format!(
                "update frequency must be a positive number, got {}",
                self.update_frequency
            )));
        }
        if self.snapshot_timeout.is_some_and(|t| t.is_zero()) {
            return Err(FlutError::InvalidConfig(
                "snapshot timeout must be non-zero".into(),
            ));
        }
        self.poll_interval()?;
        Ok(())
    }

    /// Time between snapshot ticks. Fails when the frequency is not
    /// positive or the period does not fit a non-zero `Duration`.
    pub fn poll_interval(&self) -> Result<Duration, FlutError> {
        let period = Duration::try_from_secs_f64(1.0 / self.update_frequency).map_err(|_| {
            FlutError::InvalidConfig(format!(
                "update frequency {} Hz is too low",
                self.update_frequency
            ))
        })?;
        if period.is_zero() {
            return Err(FlutError::InvalidConfig(format!(
                "update frequency {} Hz is too high",
                self.update_frequency
            )));
        }
        Ok(period)
    }
}

// ── MessageOutcome ───────────────────────────────────────────────

/// What handling one server message did.
#[derive(Debug)]
pub enum MessageOutcome {
    /// Dimensions updated and the sink resized.
    Resized(Dimensions),
    /// A snapshot was decoded and drawn.
    Rendered(Dimensions),
    /// The message was rejected; the session carries on.
    Rejected(FlutError),
    /// No connection is held, so the message was dropped.
    Ignored,
}

// ── Session ──────────────────────────────────────────────────────

/// Pixelflut viewer session over an injected transport and sink.
pub struct Session<C: Connector, S: RenderSink> {
    config: SessionConfig,
    connector: C,
    sink: S,
    phase: ConnectionPhase,
    handle: Option<C::Handle>,
    dimensions: Option<Dimensions>,
    scheduler: PollScheduler,
    decoder: FrameDecoder,
}

impl<C: Connector, S: RenderSink> Session<C, S> {
    /// Create a disconnected session.
    pub fn new(config: SessionConfig, connector: C, sink: S) -> Result<Self, FlutError> {
        config.validate()?;
        let scheduler = PollScheduler::new(config.poll_interval()?, config.snapshot_timeout);
        Ok(Self {
            config,
            connector,
            sink,
            phase: ConnectionPhase::Disconnected,
            handle: None,
            dimensions: None,
            scheduler,
            decoder: FrameDecoder::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> &ConnectionPhase {
        &self.phase
    }

    /// Whether a transport handle is held, open or still opening.
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Canvas size, or `None` until the server has reported it.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    /// Whether a snapshot request is waiting for its answer.
    pub fn is_request_outstanding(&self) -> bool {
        self.scheduler.is_outstanding()
    }

    /// Whether the driver should be delivering ticks.
    pub fn is_polling(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn poll_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // ── Caller operations ────────────────────────────────────────

    /// Start connecting. Completes when the transport reports open.
    pub fn connect(&mut self) -> Result<(), FlutError> {
        if self.handle.is_some() || !self.phase.is_disconnected() {
            return Err(FlutError::AlreadyConnected {
                url: self.config.url.clone(),
            });
        }

        self.phase.begin_connect()?;
        match self.connector.open(&self.config.url, SUBPROTOCOL) {
            Ok(handle) => {
                info!("connecting to {}", self.config.url);
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.phase.force_disconnect();
                Err(e)
            }
        }
    }

    /// Request a close. Teardown happens in [`on_close`](Self::on_close).
    pub fn disconnect(&mut self) -> Result<(), FlutError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(FlutError::NotConnected);
        };
        self.phase.begin_disconnect()?;
        info!("disconnecting from {}", self.config.url);
        handle.close();
        Ok(())
    }

    // ── Transport events ─────────────────────────────────────────

    /// Dispatch one transport event.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<MessageOutcome> {
        match event {
            TransportEvent::Open => {
                self.on_open();
                None
            }
            TransportEvent::Message(text) => Some(self.on_message(&text)),
            TransportEvent::Close { reason } => {
                self.on_close(reason.as_deref());
                None
            }
        }
    }

    /// The transport confirmed open: ask for the size and start polling.
    pub fn on_open(&mut self) {
        if self.handle.is_none() {
            debug!("ignoring open for a dropped connection");
            return;
        }
        if let Err(e) = self.phase.complete_open() {
            // disconnect() raced the open; the close is already queued.
            debug!("not starting polling: {e}");
            return;
        }

        info!("connected to {}", self.config.url);
        let query = self.scheduler.start();
        if let Err(e) = self.send(query) {
            warn!("failed to send {query}: {e}");
        }
    }

    /// Parse and route one server message.
    pub fn on_message(&mut self, text: &str) -> MessageOutcome {
        if self.handle.is_none() {
            debug!("dropping message received without a connection");
            return MessageOutcome::Ignored;
        }

        let outcome = match ServerMessage::parse(text) {
            Ok(ServerMessage::DimensionReport { width, height }) => {
                let dims = Dimensions::new(width, height);
                debug!("canvas is {dims}");
                self.dimensions = Some(dims);
                self.sink.resize_surface(width, height);
                MessageOutcome::Resized(dims)
            }
            Ok(ServerMessage::StateReport { encoding, payload }) => {
                let outcome = self.render_state(encoding, payload);
                self.scheduler.complete();
                outcome
            }
            Ok(ServerMessage::Unrecognized(_)) => MessageOutcome::Rejected(
                FlutError::UnrecognizedCommand(text.trim_end().to_string()),
            ),
            Err(e @ FlutError::MalformedState(_)) => {
                // Still the answer to the outstanding request.
                self.scheduler.complete();
                MessageOutcome::Rejected(e)
            }
            Err(e) => MessageOutcome::Rejected(e),
        };

        if let MessageOutcome::Rejected(e) = &outcome {
            warn!("cannot handle server message: {e}");
        }
        outcome
    }

    /// The transport is gone, whatever the cause.
    pub fn on_close(&mut self, reason: Option<&str>) {
        self.scheduler.cancel();
        if self.handle.take().is_some() {
            let reason = reason.unwrap_or("no reason given");
            match self.phase.uptime() {
                Some(up) => info!("connection to {} closed after {up:.1?}: {reason}", self.config.url),
                None => info!("connection to {} closed: {reason}", self.config.url),
            }
        }
        self.dimensions = None;
        self.phase.force_disconnect();
    }

    /// Timer tick. Returns `true` if a snapshot request was sent.
    pub fn on_tick(&mut self) -> bool {
        self.on_tick_at(Instant::now())
    }

    /// Timer tick at an explicit time.
    pub fn on_tick_at(&mut self, now: Instant) -> bool {
        let Some(request) = self.scheduler.tick(now) else {
            return false;
        };
        match self.send(request) {
            Ok(()) => true,
            Err(e) => {
                warn!("failed to send {request}: {e}");
                self.scheduler.complete();
                false
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────

    fn send(&mut self, request: ClientRequest) -> Result<(), FlutError> {
        let handle = self.handle.as_mut().ok_or(FlutError::NotConnected)?;
        debug!("sending {request}");
        handle.send(&request.to_wire())
    }

    fn render_state(&mut self, encoding: &str, payload: &str) -> MessageOutcome {
        let Some(encoding) = Encoding::from_wire(encoding) else {
            return MessageOutcome::Rejected(FlutError::UnsupportedEncoding(encoding.to_string()));
        };

        match self.decoder.decode(encoding, payload, self.dimensions) {
            Ok(frame) => {
                self.sink.draw_frame(frame, 0, 0);
                MessageOutcome::Rendered(frame.dimensions())
            }
            Err(e) => MessageOutcome::Rejected(e.into()),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
