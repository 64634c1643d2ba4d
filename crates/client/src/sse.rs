//! `text/event-stream` frame decoder.
//!
//! The service pushes named events over a long-lived HTTP response body.
//! Fields accumulate line by line and a frame is dispatched on a blank
//! line, but only when it carries data. Comment lines and unknown fields
//! are skipped.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name from the `event:` field, when present.
    pub name: Option<String>,
    /// Event data; multi-line data is joined with `\n`.
    pub data: String,
    /// Most recent `id:` field seen on the stream, if any.
    pub id: Option<String>,
}

/// A frame may not exceed this many buffered bytes between dispatches.
const MAX_FRAME_BYTES: usize = 1024 * 1024;

#[derive(Debug, Default)]
pub struct SseDecoder {
    name: Option<String>,
    data: String,
    id: Option<String>,
    // A CR at a chunk boundary may be followed by its LF in the next
    // chunk; that LF must not count as a second line terminator.
    pending_lf: bool,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        if self.data.is_empty() {
            // Nothing to dispatch; the buffered name does not survive an
            // empty frame.
            self.name = None;
            return None;
        }
        let mut data = std::mem::take(&mut self.data);
        data.pop(); // every data line appended a trailing newline
        Some(SseFrame {
            name: self.name.take(),
            data,
            id: self.id.clone(),
        })
    }

    fn handle_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.take_frame();
        }
        if line.starts_with(':') {
            // comment / keep-alive
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.name = Some(value.to_string()),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" => self.id = Some(value.to_string()),
            // "retry" and anything unrecognized
            _ => {}
        }
        None
    }
}

impl Decoder for SseDecoder {
    type Item = SseFrame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<SseFrame>, io::Error> {
        if self.pending_lf {
            if src.is_empty() {
                return Ok(None);
            }
            if src[0] == b'\n' {
                let _ = src.split_to(1);
            }
            self.pending_lf = false;
        }

        while let Some(end) = src.iter().position(|&b| b == b'\n' || b == b'\r') {
            let line = src.split_to(end);
            let terminator = src.split_to(1);
            if terminator[0] == b'\r' {
                if src.first() == Some(&b'\n') {
                    let _ = src.split_to(1);
                } else if src.is_empty() {
                    self.pending_lf = true;
                }
            }

            let line = std::str::from_utf8(&line)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            if let Some(frame) = self.handle_line(line) {
                return Ok(Some(frame));
            }
        }

        if src.len() + self.data.len() > MAX_FRAME_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "event frame too large",
            ));
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<SseFrame>, io::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                // A partial frame at end of stream is discarded.
                src.clear();
                Ok(None)
            }
        }
    }
}
