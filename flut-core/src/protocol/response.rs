//! Server → client reports.
//!
//! [`ServerMessage::parse`] is the only place wire text is interpreted.
//! Command names are matched case-insensitively; anything else falls
//! through to [`ServerMessage::Unrecognized`] so new server commands
//! fail closed.

use crate::error::FlutError;

/// A single parsed server message. Borrows from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage<'a> {
    /// `SIZE <w> <h>`
    DimensionReport { width: u32, height: u32 },
    /// `STATE <encoding> <payload>`
    ///
    /// The encoding is kept verbatim; support is decided by the caller.
    StateReport { encoding: &'a str, payload: &'a str },
    /// Any other first token (possibly empty).
    Unrecognized(&'a str),
}

impl<'a> ServerMessage<'a> {
    /// Parse one text message.
    ///
    /// A trailing newline is stripped, then the text is split on
    /// whitespace. Errors are returned only for the known commands
    /// with bad arguments.
    pub fn parse(text: &'a str) -> Result<Self, FlutError> {
        let line = text.trim_end_matches(['\n', '\r']);
        let mut tokens = line.split_whitespace();

        let Some(command) = tokens.next() else {
            return Ok(ServerMessage::Unrecognized(""));
        };

        if command.eq_ignore_ascii_case("size") {
            let args: Vec<&str> = tokens.collect();
            let [w, h] = args.as_slice() else {
                return Err(FlutError::MalformedSize(line.to_string()));
            };
            let (Ok(width), Ok(height)) = (w.parse::<u32>(), h.parse::<u32>()) else {
                return Err(FlutError::MalformedSize(line.to_string()));
            };
            Ok(ServerMessage::DimensionReport { width, height })
        } else if command.eq_ignore_ascii_case("state") {
            let encoding = tokens.next().ok_or(FlutError::MalformedState("encoding"))?;
            let payload = tokens.next().ok_or(FlutError::MalformedState("payload"))?;
            Ok(ServerMessage::StateReport { encoding, payload })
        } else {
            Ok(ServerMessage::Unrecognized(command))
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_report() {
        let msg = ServerMessage::parse("SIZE 800 600\n").unwrap();
        assert_eq!(msg, ServerMessage::DimensionReport { width: 800, height: 600 });
    }

    #[test]
    fn command_case_insensitive() {
        assert!(matches!(
            ServerMessage::parse("size 3 2").unwrap(),
            ServerMessage::DimensionReport { width: 3, height: 2 }
        ));
        assert!(matches!(
            ServerMessage::parse("StAtE rgba64 AAAA").unwrap(),
            ServerMessage::StateReport { encoding: "rgba64", payload: "AAAA" }
        ));
    }

    #[test]
    fn zero_size_is_valid() {
        assert_eq!(
            ServerMessage::parse("SIZE 0 0").unwrap(),
            ServerMessage::DimensionReport { width: 0, height: 0 }
        );
    }

    #[test]
    fn size_rejects_bad_arguments() {
        for text in ["SIZE", "SIZE 3", "SIZE 3 2 1", "SIZE a 2", "SIZE -1 2", "SIZE 3 2.5"] {
            let err = ServerMessage::parse(text).unwrap_err();
            assert!(matches!(err, FlutError::MalformedSize(_)), "{text}");
        }
    }

    #[test]
    fn state_report_borrows_tokens() {
        let msg = ServerMessage::parse("STATE RGBA64 AAECAw==\r\n").unwrap();
        assert_eq!(
            msg,
            ServerMessage::StateReport {
                encoding: "RGBA64",
                payload: "AAECAw=="
            }
        );
    }

    #[test]
    fn state_report_missing_fields() {
        assert!(matches!(
            ServerMessage::parse("STATE").unwrap_err(),
            FlutError::MalformedState("encoding")
        ));
        assert!(matches!(
            ServerMessage::parse("STATE rgba64").unwrap_err(),
            FlutError::MalformedState("payload")
        ));
    }

    #[test]
    fn unknown_command_falls_through() {
        assert_eq!(
            ServerMessage::parse("PX 1 2 ff0000").unwrap(),
            ServerMessage::Unrecognized("PX")
        );
        assert_eq!(ServerMessage::parse("\n").unwrap(), ServerMessage::Unrecognized(""));
    }
}
