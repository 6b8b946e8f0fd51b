//! Writes a decoded frame to disk as a PAM (`P7`) image.
//!
//! PAM carries RGBA natively, so frame bytes are written unchanged
//! after a short text header.

use std::io::Write;
use std::path::Path;

use flut_core::DecodedFrame;

/// Serialise a frame as a PAM image.
pub fn encode_pam(frame: &DecodedFrame) -> Vec<u8> {
    let header = format!(
        "P7\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
        frame.width, frame.height
    );
    let mut out = Vec::with_capacity(header.len() + frame.data.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&frame.data);
    out
}

/// Write `frame` to `path`. Frames without pixels are refused.
pub fn write_pam(path: &Path, frame: &DecodedFrame) -> std::io::Result<()> {
    if frame.data.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no frame has been rendered",
        ));
    }
    let mut file = std::fs::File::create(path)?;
    file.write_all(&encode_pam(frame))?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DecodedFrame {
        DecodedFrame {
            width: 2,
            height: 1,
            data: vec![255, 0, 0, 255, 0, 0, 255, 128],
        }
    }

    #[test]
    fn header_then_pixels() {
        let pam = encode_pam(&frame());
        let text = String::from_utf8_lossy(&pam);
        assert!(text.starts_with("P7\nWIDTH 2\nHEIGHT 1\nDEPTH 4\n"));
        assert!(pam.ends_with(&[255, 0, 0, 255, 0, 0, 255, 128]));
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvas.pam");
        write_pam(&path, &frame()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), encode_pam(&frame()));
    }

    #[test]
    fn empty_frame_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_pam(&dir.path().join("x.pam"), &DecodedFrame::default()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
