//! Client → server requests and the snapshot encodings they name.

use std::fmt;

// ── Encoding ─────────────────────────────────────────────────────

/// Snapshot encodings this client can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Base64 text wrapping raw row-major RGBA8888 bytes, one full
    /// canvas per snapshot.
    #[default]
    Rgba64,
}

impl Encoding {
    /// The identifier used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Encoding::Rgba64 => "rgba64",
        }
    }

    /// Match a wire identifier, ignoring ASCII case.
    ///
    /// Returns `None` for any encoding this client does not support.
    pub fn from_wire(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case(Encoding::Rgba64.as_str()) {
            Some(Encoding::Rgba64)
        } else {
            None
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ClientRequest ────────────────────────────────────────────────

/// A request the viewer sends to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRequest {
    /// Ask for the canvas dimensions.
    Size,
    /// Ask for a full-canvas snapshot in the given encoding.
    State(Encoding),
}

impl ClientRequest {
    /// Render the request as wire text (no trailing newline).
    pub fn to_wire(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientRequest::Size => f.write_str("SIZE"),
            ClientRequest::State(encoding) => write!(f, "STATE {encoding}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_text() {
        assert_eq!(ClientRequest::Size.to_wire(), "SIZE");
        assert_eq!(ClientRequest::State(Encoding::Rgba64).to_wire(), "STATE rgba64");
    }

    #[test]
    fn encoding_is_case_insensitive() {
        assert_eq!(Encoding::from_wire("rgba64"), Some(Encoding::Rgba64));
        assert_eq!(Encoding::from_wire("RGBA64"), Some(Encoding::Rgba64));
        assert_eq!(Encoding::from_wire("RgBa64"), Some(Encoding::Rgba64));
    }

    #[test]
    fn unknown_encoding() {
        assert_eq!(Encoding::from_wire("png"), None);
        assert_eq!(Encoding::from_wire("rgba"), None);
        assert_eq!(Encoding::from_wire(""), None);
    }
}
