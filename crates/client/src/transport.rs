use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Serialize;
use tracing::debug;
use types::{
    codec::{EnvelopeEncode, SignatureEncode},
    errors::ClientError,
    network::Network,
};

use crate::ConstellationClient;

#[derive(Serialize)]
struct SignaturesBody {
    sig: Vec<String>,
}

#[derive(Serialize)]
struct TransactionBody {
    txenv: String,
    network: String,
}

impl ConstellationClient {
    /// Submits collected signatures for the transaction identified by
    /// `hash`.
    ///
    /// Signatures are sent base64-encoded, in the given order. The service
    /// decides whether the set is acceptable; an empty set is passed
    /// through unchecked. Resolves with the raw response on any 2xx.
    pub async fn submit_signatures<S: SignatureEncode>(
        &self,
        hash: &str,
        sigs: &[S],
    ) -> Result<reqwest::Response, ClientError> {
        let sig = sigs
            .iter()
            .map(|s| s.encode().map(|bytes| BASE64.encode(bytes)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ClientError::Encode)?;

        let url = format!("{}/transaction/{hash}", self.base_url);
        debug!(%url, count = sig.len(), "submitting signatures");

        let response = self
            .http
            .put(&url)
            .json(&SignaturesBody { sig })
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        expect_success(response)
    }

    /// Submits a transaction for collaborative signing, on the live
    /// network unless `network` says otherwise.
    pub async fn submit_transaction<T: EnvelopeEncode>(
        &self,
        tx: &T,
        network: Option<Network>,
    ) -> Result<reqwest::Response, ClientError> {
        let envelope = tx.encode().map_err(ClientError::Encode)?;
        let body = TransactionBody {
            txenv: BASE64.encode(envelope),
            network: network.unwrap_or_default().id().to_string(),
        };

        let url = format!("{}/transaction", self.base_url);
        debug!(%url, network = %body.network, "submitting transaction");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        expect_success(response)
    }
}

fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status(response.status().as_u16()))
    }
}
