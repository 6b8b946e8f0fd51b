//! Snapshot decoding: `rgba64` payload → [`DecodedFrame`].

pub mod decoder;
pub mod types;

pub use decoder::{FrameDecoder, encode_rgba64};
pub use types::{BYTES_PER_PIXEL, DecodedFrame, Dimensions};
