#[cfg(test)]
mod transport_test {
    use assert_matches::assert_matches;
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use client::ConstellationClient;
    use types::codec::{EnvelopeEncode, SignatureEncode};
    use types::errors::ClientError;
    use types::network::Network;

    use crate::mocks::{MockResponse, MockServer, init_tracing};

    struct FakeSignature(&'static [u8]);

    impl SignatureEncode for FakeSignature {
        fn encode(&self) -> Result<Vec<u8>, String> {
            Ok(self.0.to_vec())
        }
    }

    struct BrokenSignature;

    impl SignatureEncode for BrokenSignature {
        fn encode(&self) -> Result<Vec<u8>, String> {
            Err("hardware wallet unplugged".to_string())
        }
    }

    struct FakeTransaction(&'static [u8]);

    impl EnvelopeEncode for FakeTransaction {
        fn encode(&self) -> Result<Vec<u8>, String> {
            Ok(self.0.to_vec())
        }
    }

    #[tokio::test]
    async fn submit_signatures_puts_ordered_encoded_sigs() {
        init_tracing();
        let server = MockServer::start(MockResponse::ok()).await;
        let client = ConstellationClient::new(Some(server.base_url()));

        let sigs = [FakeSignature(b"sig-one"), FakeSignature(b"sig-two")];
        let response = client.submit_signatures("abc123", &sigs).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let requests = server.wait_for_requests(1).await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].path, "/transaction/abc123");
        assert_eq!(
            requests[0].json_body(),
            serde_json::json!({
                "sig": [BASE64.encode(b"sig-one"), BASE64.encode(b"sig-two")]
            })
        );
    }

    #[tokio::test]
    async fn submit_signatures_allows_empty_set() {
        let server = MockServer::start(MockResponse::ok()).await;
        let client = ConstellationClient::new(Some(server.base_url()));

        let sigs: [FakeSignature; 0] = [];
        client.submit_signatures("abc123", &sigs).await.unwrap();

        let requests = server.wait_for_requests(1).await;
        assert_eq!(requests[0].json_body(), serde_json::json!({ "sig": [] }));
    }

    #[tokio::test]
    async fn submit_transaction_defaults_to_live_network() {
        let server = MockServer::start(MockResponse::ok()).await;
        let client = ConstellationClient::new(Some(server.base_url()));

        client
            .submit_transaction(&FakeTransaction(b"envelope"), None)
            .await
            .unwrap();

        let requests = server.wait_for_requests(1).await;
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/transaction");
        assert_eq!(
            requests[0].json_body(),
            serde_json::json!({
                "txenv": BASE64.encode(b"envelope"),
                "network": "7ac33997"
            })
        );
    }

    #[tokio::test]
    async fn submit_transaction_honors_network_override() {
        let server = MockServer::start(MockResponse::ok()).await;
        let client = ConstellationClient::new(Some(server.base_url()));

        client
            .submit_transaction(&FakeTransaction(b"envelope"), Some(Network::Testnet))
            .await
            .unwrap();
        client
            .submit_transaction(
                &FakeTransaction(b"envelope"),
                Some(Network::Custom("deadbeef".to_string())),
            )
            .await
            .unwrap();

        let requests = server.wait_for_requests(2).await;
        assert_eq!(requests[0].json_body()["network"], "cee0302d");
        assert_eq!(requests[1].json_body()["network"], "deadbeef");
    }

    #[tokio::test]
    async fn non_2xx_status_is_an_error() {
        let server = MockServer::start(MockResponse::Json {
            status: 503,
            body: "{}".to_string(),
        })
        .await;
        let client = ConstellationClient::new(Some(server.base_url()));

        let err = client
            .submit_signatures("abc123", &[FakeSignature(b"sig")])
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::Status(503));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Bind and immediately drop a listener so the port is closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ConstellationClient::new(Some(format!("http://{addr}")));

        let err = client
            .submit_transaction(&FakeTransaction(b"envelope"), None)
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::Transport(_));
    }

    #[tokio::test]
    async fn encoding_failure_skips_the_request() {
        let server = MockServer::start(MockResponse::ok()).await;
        let client = ConstellationClient::new(Some(server.base_url()));

        let err = client
            .submit_signatures("abc123", &[BrokenSignature])
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::Encode(ref reason) if reason.contains("unplugged"));
        assert!(server.requests().is_empty());
    }
}
