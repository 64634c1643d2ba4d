use std::fmt;

use serde::{Deserialize, Serialize};

/// Network a transaction or signer account lives on.
///
/// The service tags everything it relays with an opaque network id. `Live`
/// and `Testnet` cover the two deployed networks; `Custom` passes any other
/// id through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Network {
    #[default]
    Live,
    Testnet,
    Custom(String),
}

impl Network {
    pub const LIVE_ID: &'static str = "7ac33997";
    pub const TESTNET_ID: &'static str = "cee0302d";

    /// The wire id sent to the service.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Live => Self::LIVE_ID,
            Self::Testnet => Self::TESTNET_ID,
            Self::Custom(id) => id,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
