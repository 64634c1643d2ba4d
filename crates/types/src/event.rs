use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::errors::ClientError;

/// Named event kinds emitted on a Constellation event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Request,
    Progress,
    AddSigner,
    RemoveSigner,
}

impl EventKind {
    /// The event name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Progress => "progress",
            Self::AddSigner => "add_signer",
            Self::RemoveSigner => "remove_signer",
        }
    }

    /// Resolves a wire event name; unrecognized names map to `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "request" => Some(Self::Request),
            "progress" => Some(Self::Progress),
            "add_signer" => Some(Self::AddSigner),
            "remove_signer" => Some(Self::RemoveSigner),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated signature weight for one account, against the threshold it
/// needs to be fully signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProgress {
    pub weight: u32,
    pub threshold: u32,
}

impl AccountProgress {
    #[must_use]
    pub const fn is_met(self) -> bool {
        self.weight >= self.threshold
    }
}

/// Signing progress keyed by account id. Key order carries no meaning.
pub type ProgressMap = HashMap<String, AccountProgress>;

/// True when every account in the map has reached its threshold.
#[must_use]
pub fn is_fully_signed(progress: &ProgressMap) -> bool {
    progress.values().all(|account| account.is_met())
}

/// Payload of a `request` event: a transaction one of the watched keys is
/// asked to co-sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningRequest {
    /// Recipient pubkeys this request is addressed to.
    pub id: Vec<String>,
    /// Base64 transaction envelope to be signed.
    pub txenv: String,
    /// Network id the transaction is on.
    pub network: String,
    pub progress: ProgressMap,
}

impl SigningRequest {
    #[must_use]
    pub fn is_fully_signed(&self) -> bool {
        is_fully_signed(&self.progress)
    }
}

/// Payload of a `progress` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Hash of the transaction being signed.
    pub hash: String,
    pub progress: ProgressMap,
}

impl ProgressUpdate {
    #[must_use]
    pub fn is_fully_signed(&self) -> bool {
        is_fully_signed(&self.progress)
    }
}

/// Payload of `add_signer` and `remove_signer` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerChange {
    /// Recipient pubkey the notification is for.
    pub id: String,
    /// Account the recipient was added to or removed from as a signer.
    pub account: String,
    /// Network id the account is on.
    pub network: String,
}

/// A decoded stream event, tagged by kind.
#[derive(Debug, Clone)]
pub enum Event {
    Request(SigningRequest),
    Progress(ProgressUpdate),
    AddSigner(SignerChange),
    RemoveSigner(SignerChange),
}

impl Event {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Request(_) => EventKind::Request,
            Self::Progress(_) => EventKind::Progress,
            Self::AddSigner(_) => EventKind::AddSigner,
            Self::RemoveSigner(_) => EventKind::RemoveSigner,
        }
    }

    /// Decodes the JSON payload carried by an event of the given kind.
    pub fn decode(kind: EventKind, data: &str) -> Result<Self, ClientError> {
        let event = match kind {
            EventKind::Request => Self::Request(parse(kind, data)?),
            EventKind::Progress => Self::Progress(parse(kind, data)?),
            EventKind::AddSigner => Self::AddSigner(parse(kind, data)?),
            EventKind::RemoveSigner => Self::RemoveSigner(parse(kind, data)?),
        };
        Ok(event)
    }
}

fn parse<T: DeserializeOwned>(kind: EventKind, data: &str) -> Result<T, ClientError> {
    serde_json::from_str(data).map_err(|e| ClientError::Decode {
        kind,
        message: e.to_string(),
    })
}
