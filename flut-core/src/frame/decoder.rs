//! Snapshot decoder.
//!
//! Turns the payload of a `STATE` report into a [`DecodedFrame`] that
//! can be handed to a [`RenderSink`](crate::render::RenderSink).
//! Anything short of a complete, correctly sized frame is an error;
//! partial frames are never rendered.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::DecodeError;
use crate::frame::types::{DecodedFrame, Dimensions};
use crate::protocol::Encoding;

/// Encode raw RGBA bytes as an `rgba64` payload.
pub fn encode_rgba64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

// ── FrameDecoder ─────────────────────────────────────────────────

/// Decoder that reuses one frame buffer across snapshots.
pub struct FrameDecoder {
    frame: DecodedFrame,
}

impl FrameDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self {
            frame: DecodedFrame::default(),
        }
    }

    /// Decode a snapshot payload for a canvas of `dimensions`.
    ///
    /// The returned frame borrows the decoder's buffer and is valid
    /// until the next call.
    pub fn decode(
        &mut self,
        encoding: Encoding,
        payload: &str,
        dimensions: Option<Dimensions>,
    ) -> Result<&DecodedFrame, DecodeError> {
        let dims = dimensions.ok_or(DecodeError::UnknownDimensions)?;
        match encoding {
            Encoding::Rgba64 => self.decode_rgba64(payload, dims),
        }
    }

    // ── Internal ─────────────────────────────────────────────────

    fn decode_rgba64(
        &mut self,
        payload: &str,
        dims: Dimensions,
    ) -> Result<&DecodedFrame, DecodeError> {
        let overflow = || DecodeError::Overflow {
            width: dims.width,
            height: dims.height,
        };
        let expected = dims.frame_len().ok_or_else(overflow)?;
        let encoded_len = expected.div_ceil(3).checked_mul(4).ok_or_else(overflow)?;

        // Padded base64 of `expected` bytes has exactly this length, so
        // anything else is rejected before allocating.
        if payload.len() != encoded_len {
            self.reset();
            let actual = payload.trim_end_matches('=').len() * 3 / 4;
            return Err(DecodeError::LengthMismatch { expected, actual });
        }

        self.frame.data.clear();
        if let Err(e) = STANDARD.decode_vec(payload, &mut self.frame.data) {
            self.reset();
            return Err(e.into());
        }

        let actual = self.frame.data.len();
        if actual != expected {
            self.reset();
            return Err(DecodeError::LengthMismatch { expected, actual });
        }

        self.frame.width = dims.width;
        self.frame.height = dims.height;
        Ok(&self.frame)
    }

    fn reset(&mut self) {
        self.frame.data.clear();
        self.frame.width = 0;
        self.frame.height = 0;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────
