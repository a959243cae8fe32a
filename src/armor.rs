//! ASCII armor codec.
//!
//! Wraps a binary saltpack message in a `BEGIN SALTPACK ... MESSAGE.` /
//! `END SALTPACK ... MESSAGE.` envelope with a standard-base64 body,
//! line-wrapped at a fixed width. The body encoding reuses the teacher's
//! base64 choice (`base64::prelude::BASE64_STANDARD`, see
//! `cipher/base64.rs`); the fixed-width line wrapping follows the same
//! shape as the `ColWriter<W, N>` helper in `pipeline/cipher/brainfuck.rs`,
//! which exists precisely to wrap encoded output at a column count.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::{Error, Result};

/// Characters per line in the armored body, matching the reference
/// saltpack armor width.
const LINE_WIDTH: usize = 43;

/// The kind of message an armor envelope wraps, used in its header and
/// footer lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageType {
    Encrypted,
    Signed,
}

impl MessageType {
    fn label(self) -> &'static str {
        match self {
            Self::Encrypted => "ENCRYPTED",
            Self::Signed => "SIGNED",
        }
    }
}

/// Wrap `bytes` in an ASCII-armored envelope.
#[must_use]
pub fn armor(bytes: &[u8], message_type: MessageType) -> String {
    let body = BASE64_STANDARD.encode(bytes);

    let mut out = String::new();
    out.push_str("BEGIN SALTPACK ");
    out.push_str(message_type.label());
    out.push_str(" MESSAGE.\n");

    for line in body.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(std::str::from_utf8(line).expect("base64 output is ASCII"));
        out.push('\n');
    }

    out.push_str("END SALTPACK ");
    out.push_str(message_type.label());
    out.push_str(" MESSAGE.\n");
    out
}

/// Unwrap an armored envelope back into its original bytes.
///
/// # Errors
///
/// Returns `Error::ArmorError` if the envelope is missing its header or
/// footer line, or if the body is not valid base64.
pub fn dearmor(text: &str) -> Result<Vec<u8>> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    if lines.len() < 3 {
        return Err(Error::ArmorError("message is too short to be armored".into()));
    }

    let first = *lines.first().unwrap();
    let last = *lines.last().unwrap();

    if !first.starts_with("BEGIN SALTPACK ") || !first.ends_with(" MESSAGE.") {
        return Err(Error::ArmorError("missing BEGIN SALTPACK ... MESSAGE. header".into()));
    }
    if !last.starts_with("END SALTPACK ") || !last.ends_with(" MESSAGE.") {
        return Err(Error::ArmorError("missing END SALTPACK ... MESSAGE. footer".into()));
    }

    let body: String = lines[1..lines.len() - 1].concat();

    BASE64_STANDARD
        .decode(body)
        .map_err(|reason| Error::ArmorError(format!("invalid base64 body: {reason}")))
}
