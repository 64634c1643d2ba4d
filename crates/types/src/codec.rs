//! Seam toward the transaction codec library in use.
//!
//! The service never inspects transactions or signatures; it relays their
//! canonical binary forms as base64 text. Implement these traits for the
//! concrete types of whatever codec produces them.

/// A signature that can serialize itself to its canonical binary form.
pub trait SignatureEncode {
    fn encode(&self) -> Result<Vec<u8>, String>;
}

/// A transaction that can serialize its envelope, signatures included, to
/// its canonical binary form.
pub trait EnvelopeEncode {
    fn encode(&self) -> Result<Vec<u8>, String>;
}
