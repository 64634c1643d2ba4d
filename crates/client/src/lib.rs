pub mod sse;
pub mod subscription;
pub mod transport;

pub use subscription::{EventHandlers, ReconnectPolicy, Subscription};

/// Endpoint of the hosted production service.
pub const DEFAULT_BASE_URL: &str = "https://constellation.futuretense.io/api/v1";

/// Handle to a Constellation signature server.
///
/// Submission calls and subscriptions all go through one of these. Cheap to
/// clone; clones share the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct ConstellationClient {
    base_url: String,
    http: reqwest::Client,
    reconnect: ReconnectPolicy,
}

impl ConstellationClient {
    /// Creates a client against `url`, or the hosted production service
    /// when `None`.
    #[must_use]
    pub fn new(url: Option<String>) -> Self {
        let base_url = url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            reconnect: ReconnectPolicy::Never,
        }
    }

    /// Replaces the HTTP client, keeping the configured endpoint. Use this
    /// to bring your own pool, proxy, or TLS settings.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Sets the reconnect policy applied to event-stream subscriptions.
    #[must_use]
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
