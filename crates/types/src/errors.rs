use std::error::Error;

use derive_more::Display;

use crate::event::EventKind;

/// Errors surfaced by the Constellation client.
#[derive(Debug, Display, Clone)]
pub enum ClientError {
    /// Request-level network failure while talking to the service.
    #[display("transport error: {_0}")]
    Transport(String),
    /// The service answered with a non-2xx status. The body is not read.
    #[display("server responded with status {_0}")]
    Status(u16),
    /// A signature or transaction envelope could not be serialized.
    #[display("encoding failed: {_0}")]
    Encode(String),
    /// An event payload for a subscribed kind failed to parse.
    #[display("malformed {kind} event payload: {message}")]
    Decode { kind: EventKind, message: String },
    /// The event stream failed to open or broke mid-stream.
    #[display("event stream error: {_0}")]
    Stream(String),
    /// The server ended the event stream.
    #[display("event stream closed by server")]
    StreamClosed,
}

impl Error for ClientError {}
