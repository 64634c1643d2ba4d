use std::io;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};
use types::{
    errors::ClientError,
    event::{Event, EventKind, ProgressUpdate, SignerChange, SigningRequest},
};

use crate::ConstellationClient;
use crate::sse::{SseDecoder, SseFrame};

/// Reconnect behavior for event-stream subscriptions.
///
/// The service does not replay missed events on reconnect; callers that
/// need gapless delivery should treat a reconnect as a fresh view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// A dropped connection is terminal; the caller re-subscribes.
    #[default]
    Never,
    /// Reopen the stream after a dropped connection, waiting `delay`
    /// between attempts. The attempt counter resets whenever a connection
    /// opens, so the budget applies per outage.
    Retry { max_attempts: u32, delay: Duration },
}

type Handler<T> = Box<dyn FnMut(T) + Send>;

/// Callbacks for the event kinds a subscriber cares about.
///
/// Every handler is optional; events of a kind with no handler are
/// consumed and discarded without being decoded.
#[derive(Default)]
pub struct EventHandlers {
    on_request: Option<Handler<SigningRequest>>,
    on_progress: Option<Handler<ProgressUpdate>>,
    on_add_signer: Option<Handler<SignerChange>>,
    on_remove_signer: Option<Handler<SignerChange>>,
    on_error: Option<Handler<ClientError>>,
}

impl EventHandlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called for `request` events: transactions the watched keys are
    /// asked to co-sign.
    #[must_use]
    pub fn on_request(mut self, f: impl FnMut(SigningRequest) + Send + 'static) -> Self {
        self.on_request = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_progress(mut self, f: impl FnMut(ProgressUpdate) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_add_signer(mut self, f: impl FnMut(SignerChange) + Send + 'static) -> Self {
        self.on_add_signer = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_remove_signer(mut self, f: impl FnMut(SignerChange) + Send + 'static) -> Self {
        self.on_remove_signer = Some(Box::new(f));
        self
    }

    /// Receives connection failures and payload decode errors. Without it
    /// they are logged at `warn` and dropped.
    #[must_use]
    pub fn on_error(mut self, f: impl FnMut(ClientError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    fn wants(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Request => self.on_request.is_some(),
            EventKind::Progress => self.on_progress.is_some(),
            EventKind::AddSigner => self.on_add_signer.is_some(),
            EventKind::RemoveSigner => self.on_remove_signer.is_some(),
        }
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Request(payload) => {
                if let Some(f) = &mut self.on_request {
                    f(payload);
                }
            }
            Event::Progress(payload) => {
                if let Some(f) = &mut self.on_progress {
                    f(payload);
                }
            }
            Event::AddSigner(payload) => {
                if let Some(f) = &mut self.on_add_signer {
                    f(payload);
                }
            }
            Event::RemoveSigner(payload) => {
                if let Some(f) = &mut self.on_remove_signer {
                    f(payload);
                }
            }
        }
    }

    fn error(&mut self, error: ClientError) {
        if let Some(f) = &mut self.on_error {
            f(error);
        } else {
            warn!(%error, "subscription error");
        }
    }
}

/// A live event-stream subscription.
///
/// Owns the underlying connection; closing or dropping the handle closes
/// it. A handler already running finishes; nothing is dispatched after.
#[must_use = "dropping a Subscription closes its connection"]
#[derive(Debug)]
pub struct Subscription {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Closes the connection and waits for the event loop to exit.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

impl ConstellationClient {
    /// Opens an event-stream subscription for the given pubkeys.
    ///
    /// One connection is opened per call and concurrent subscriptions are
    /// independent, overlapping key sets included. This never fails
    /// synchronously; connection problems surface through the handlers'
    /// error callback.
    pub fn subscribe(&self, pubkeys: &[String], handlers: EventHandlers) -> Subscription {
        let url = events_url(&self.base_url, pubkeys);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let worker = SubscriptionWorker {
            http: self.http.clone(),
            url,
            reconnect: self.reconnect,
            handlers,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(worker.run());
        Subscription { shutdown, task }
    }
}

// The comma join is load-bearing: the service parses the path segment as a
// comma-separated key list.
fn events_url(base_url: &str, pubkeys: &[String]) -> String {
    format!("{}/events/{}", base_url, pubkeys.join(","))
}

enum StreamEnd {
    Shutdown,
    Closed,
    Failed(ClientError),
}

struct SubscriptionWorker {
    http: reqwest::Client,
    url: String,
    reconnect: ReconnectPolicy,
    handlers: EventHandlers,
    shutdown: watch::Receiver<bool>,
}

impl SubscriptionWorker {
    async fn run(mut self) {
        let mut attempts: u32 = 0;
        loop {
            let error = match self.run_connection(&mut attempts).await {
                StreamEnd::Shutdown => {
                    debug!(url = %self.url, "subscription closed");
                    return;
                }
                StreamEnd::Closed => ClientError::StreamClosed,
                StreamEnd::Failed(error) => error,
            };

            match self.reconnect {
                ReconnectPolicy::Retry {
                    max_attempts,
                    delay,
                } if attempts < max_attempts => {
                    attempts += 1;
                    warn!(
                        url = %self.url,
                        %error,
                        attempt = attempts,
                        "event stream dropped, reconnecting"
                    );
                    tokio::select! {
                        () = sleep(delay) => {}
                        _ = self.shutdown.changed() => return,
                    }
                }
                _ => {
                    self.handlers.error(error);
                    return;
                }
            }
        }
    }

    async fn run_connection(&mut self, attempts: &mut u32) -> StreamEnd {
        info!(url = %self.url, "opening event stream");
        let request = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let response = tokio::select! {
            result = request.send() => result,
            _ = self.shutdown.changed() => return StreamEnd::Shutdown,
        };
        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => return StreamEnd::Failed(ClientError::Status(r.status().as_u16())),
            Err(e) => return StreamEnd::Failed(ClientError::Stream(e.to_string())),
        };
        // Connected; a later drop starts with a fresh retry budget.
        *attempts = 0;

        let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
        let mut frames = FramedRead::new(StreamReader::new(body), SseDecoder::new());

        loop {
            let frame = tokio::select! {
                frame = frames.next() => frame,
                _ = self.shutdown.changed() => return StreamEnd::Shutdown,
            };
            match frame {
                Some(Ok(frame)) => self.dispatch(frame),
                Some(Err(e)) => return StreamEnd::Failed(ClientError::Stream(e.to_string())),
                None => return StreamEnd::Closed,
            }
        }
    }

    fn dispatch(&mut self, frame: SseFrame) {
        let Some(name) = frame.name else {
            debug!("dropping unnamed event");
            return;
        };
        let Some(kind) = EventKind::from_name(&name) else {
            debug!(event = %name, "dropping unrecognized event");
            return;
        };
        if !self.handlers.wants(kind) {
            debug!(event = %kind, "no handler registered, dropping event");
            return;
        }
        match Event::decode(kind, &frame.data) {
            Ok(event) => self.handlers.dispatch(event),
            Err(error) => self.handlers.error(error),
        }
    }
}
