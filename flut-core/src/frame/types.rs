//! Shared frame types for the decode → render path.

/// Bytes per pixel in every decoded frame (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

// ── Dimensions ───────────────────────────────────────────────────

/// Canvas size as reported by the server.
///
/// The session holds an `Option<Dimensions>`; `None` means no `SIZE`
/// report has arrived on the current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Byte length of a full RGBA frame at this size, or `None` if it
    /// does not fit in `usize`.
    pub fn frame_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(BYTES_PER_PIXEL)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ── DecodedFrame ─────────────────────────────────────────────────

/// A full canvas snapshot ready for rendering.
///
/// `data` holds `height` tightly packed rows of `width * 4` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Row-major RGBA8888 bytes.
    pub data: Vec<u8>,
}

impl DecodedFrame {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}
