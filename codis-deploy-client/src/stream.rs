//! Docker attach/exec stream decoding
//!
//! Without a TTY the engine multiplexes stdout and stderr on one connection.
//! Each frame is an 8-byte header followed by the payload:
//!
//! ```text
//! [stream_type, 0, 0, 0, size (4 bytes big-endian)] payload...
//! ```
//!
//! stream_type: 0=stdin, 1=stdout, 2=stderr. With a TTY the stream is raw.

use codis_deploy_core::domain::exec::ExecOutput;

const HEADER_LEN: usize = 8;

/// Which stream a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
}

impl StreamKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(StreamKind::Stdin),
            1 => Some(StreamKind::Stdout),
            2 => Some(StreamKind::Stderr),
            _ => None,
        }
    }
}

/// Whether a buffer starts with a valid frame header
fn looks_framed(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_LEN
        && StreamKind::from_byte(bytes[0]).is_some()
        && bytes[1..4] == [0, 0, 0]
}

/// Split a multiplexed buffer into (stream, payload) frames
///
/// A truncated trailing frame yields whatever payload bytes are present.
/// A buffer that does not start with a frame header is returned as a single
/// stdout frame, since some engines send unframed output regardless of TTY.
pub fn frames(bytes: &[u8]) -> Vec<(StreamKind, &[u8])> {
    if bytes.is_empty() {
        return Vec::new();
    }
    if !looks_framed(bytes) {
        return vec![(StreamKind::Stdout, bytes)];
    }

    let mut frames = Vec::new();
    let mut rest = bytes;
    while rest.len() >= HEADER_LEN {
        let Some(kind) = StreamKind::from_byte(rest[0]) else {
            break;
        };
        let size = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let body = &rest[HEADER_LEN..];
        let take = size.min(body.len());
        frames.push((kind, &body[..take]));
        rest = &body[take..];
    }
    frames
}

/// Decode exec output, demultiplexing unless the exec had a TTY
pub fn decode_output(bytes: &[u8], tty: bool) -> ExecOutput {
    if tty {
        return ExecOutput {
            stdout: String::from_utf8_lossy(bytes).into_owned(),
            stderr: String::new(),
        };
    }

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    for (kind, payload) in frames(bytes) {
        match kind {
            StreamKind::Stdout => stdout.extend_from_slice(payload),
            StreamKind::Stderr => stderr.extend_from_slice(payload),
            StreamKind::Stdin => {}
        }
    }

    ExecOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}
