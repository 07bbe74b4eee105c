//! Reconnecting notification client.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use log::debug;
use log::info;
use log::warn;
use tokio::sync::Notify;
use tokio::sync::broadcast;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Connection;
use super::Notification;
use super::ReconnectPolicy;
use super::Transport;
use super::WsTransport;
use crate::error::NotifyError;

/// Buffered inbound notifications per subscriber.
const EVENT_CAPACITY: usize = 64;

/// Lifecycle of the notification connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    /// Waiting before retry number `attempt` (1-based).
    Reconnecting { attempt: u32 },
    /// Retries exhausted; `connect` starts over.
    Failed,
}

struct Shared {
    url: String,
    transport: Arc<dyn Transport>,
    policy: ReconnectPolicy,
    queue: Mutex<VecDeque<String>>,
    queued: Notify,
    events: broadcast::Sender<Notification>,
    state: watch::Sender<ConnectionState>,
}

impl Shared {
    fn queue(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Client for the notification WebSocket.
///
/// One background task owns the connection. Outbound messages go through a
/// queue that survives disconnects and is flushed in order once open.
/// Inbound notifications are broadcast to every subscriber.
///
/// # Example
///
/// ```ignore
/// use gestion_lib::notify::{NotificationClient, ReconnectPolicy};
///
/// let client = NotificationClient::new("wss://gestion.example.com/ws", ReconnectPolicy::default());
/// let mut events = client.subscribe();
/// client.connect();
/// client.send(r#"{"type":"PING"}"#);
///
/// while let Ok(notification) = events.recv().await {
///     println!("{}", notification.summary());
/// }
/// ```
pub struct NotificationClient {
    shared: Arc<Shared>,
    running: Mutex<Option<Running>>,
}

impl NotificationClient {
    /// Client using the WebSocket transport.
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self::with_transport(url, WsTransport, policy)
    }

    /// Client using a custom transport.
    pub fn with_transport(
        url: impl Into<String>,
        transport: impl Transport + 'static,
        policy: ReconnectPolicy,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                transport: Arc::new(transport),
                policy,
                queue: Mutex::new(VecDeque::new()),
                queued: Notify::new(),
                events,
                state,
            }),
            running: Mutex::new(None),
        }
    }

    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts the background task. Must be called within a tokio runtime.
    ///
    /// Returns `false` without doing anything if a task is already running.
    pub fn connect(&self) -> bool {
        let mut running = self.running();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            debug!("notification client already running");
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(self.shared.clone(), cancel.clone()));
        *running = Some(Running { cancel, handle });
        true
    }

    /// Stops the background task and waits for it. Safe to call repeatedly.
    ///
    /// Queued messages stay queued for the next connection.
    pub async fn disconnect(&self) {
        let running = self.running().take();
        if let Some(Running { cancel, handle }) = running {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!("notification task ended abnormally: {}", e);
            }
        }
        self.shared.set_state(ConnectionState::Disconnected);
    }

    /// Queues an outbound message.
    pub fn send(&self, message: impl Into<String>) {
        self.shared.queue().push_back(message.into());
        self.shared.queued.notify_one();
    }

    /// Queues a JSON message.
    pub fn send_json<T: serde::Serialize>(&self, message: &T) -> Result<(), NotifyError> {
        let text = serde_json::to_string(message).map_err(|e| NotifyError::Send(e.to_string()))?;
        self.send(text);
        Ok(())
    }

    /// Messages waiting to be sent.
    pub fn queued(&self) -> usize {
        self.shared.queue().len()
    }

    /// Receiver for inbound notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.shared.events.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Receiver for connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }
}

impl Drop for NotificationClient {
    fn drop(&mut self) {
        if let Some(running) = self.running().take() {
            running.cancel.cancel();
        }
    }
}

enum SessionEnd {
    Cancelled,
    Lost(NotifyError),
}

async fn run(shared: Arc<Shared>, cancel: CancellationToken) {
    let policy = shared.policy.clone();
    let mut attempt: u32 = 0;

    loop {
        if attempt == 0 {
            shared.set_state(ConnectionState::Connecting);
        }

        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = shared.transport.connect(&shared.url) => result,
        };

        match connected {
            Ok(mut conn) => {
                info!("notification channel open: {}", shared.url);
                attempt = 0;
                shared.set_state(ConnectionState::Open);

                match session(&shared, conn.as_mut(), &cancel).await {
                    SessionEnd::Cancelled => {
                        conn.close().await;
                        break;
                    }
                    SessionEnd::Lost(e) => warn!("notification channel lost: {}", e),
                }
            }
            Err(e) => warn!("notification connect failed: {}", e),
        }

        if attempt >= policy.max_attempts {
            warn!("giving up on notification channel after {} retries", attempt);
            shared.set_state(ConnectionState::Failed);
            return;
        }

        let delay = policy.delay_for(attempt);
        attempt += 1;
        shared.set_state(ConnectionState::Reconnecting { attempt });
        debug!("reconnecting in {:?} (attempt {})", delay, attempt);

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    shared.set_state(ConnectionState::Disconnected);
}

async fn session(
    shared: &Shared,
    conn: &mut dyn Connection,
    cancel: &CancellationToken,
) -> SessionEnd {
    loop {
        if let Err(e) = flush(shared, conn).await {
            return SessionEnd::Lost(e);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return SessionEnd::Cancelled,
            _ = shared.queued.notified() => continue,
            frame = conn.recv() => match frame {
                None => return SessionEnd::Lost(NotifyError::Closed),
                Some(Err(e)) => return SessionEnd::Lost(e),
                Some(Ok(text)) => dispatch(shared, &text),
            },
        }
    }
}

/// Sends queued messages in order. A message that fails stays at the front.
async fn flush(shared: &Shared, conn: &mut dyn Connection) -> Result<(), NotifyError> {
    loop {
        let next = shared.queue().pop_front();
        let Some(message) = next else {
            return Ok(());
        };
        if let Err(e) = conn.send(message.clone()).await {
            shared.queue().push_front(message);
            return Err(e);
        }
    }
}

fn dispatch(shared: &Shared, text: &str) {
    match Notification::parse(text) {
        Ok(notification) => {
            debug!("notification received: {}", notification.kind.as_str());
            // No subscribers is fine
            let _ = shared.events.send(notification);
        }
        Err(e) => warn!("dropping notification frame: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::*;
    use crate::notify::NotificationKind;

    /// Fails the first `failures` connects; later connections record sends
    /// and replay frames pushed by the test.
    struct MockTransport {
        failures: u32,
        connects: Arc<AtomicU32>,
        sent: mpsc::UnboundedSender<String>,
        inbound: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    }

    struct MockConnection {
        sent: mpsc::UnboundedSender<String>,
        inbound: Option<mpsc::UnboundedReceiver<String>>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&self, _url: &str) -> Result<Box<dyn Connection>, NotifyError> {
            let n = self.connects.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(NotifyError::Connect("refused".into()));
            }
            Ok(Box::new(MockConnection {
                sent: self.sent.clone(),
                inbound: self.inbound.lock().unwrap().take(),
            }))
        }
    }

    #[async_trait]
    impl Connection for MockConnection {
        async fn send(&mut self, text: String) -> Result<(), NotifyError> {
            self.sent.send(text).map_err(|_| NotifyError::Closed)
        }

        async fn recv(&mut self) -> Option<Result<String, NotifyError>> {
            match self.inbound.as_mut() {
                Some(rx) => rx.recv().await.map(Ok),
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) {}
    }

    struct Harness {
        client: NotificationClient,
        connects: Arc<AtomicU32>,
        sent: mpsc::UnboundedReceiver<String>,
        inbound: mpsc::UnboundedSender<String>,
    }

    fn harness(failures: u32, policy: ReconnectPolicy) -> Harness {
        let (sent_tx, sent) = mpsc::unbounded_channel();
        let (inbound, inbound_rx) = mpsc::unbounded_channel();
        let connects = Arc::new(AtomicU32::new(0));
        let transport = MockTransport {
            failures,
            connects: connects.clone(),
            sent: sent_tx,
            inbound: Mutex::new(Some(inbound_rx)),
        };
        Harness {
            client: NotificationClient::with_transport("ws://test", transport, policy),
            connects,
            sent,
            inbound,
        }
    }

    async fn wait_for(client: &NotificationClient, state: ConnectionState) {
        let mut rx = client.watch_state();
        rx.wait_for(|s| *s == state).await.unwrap();
    }

    #[tokio::test]
    async fn test_queue_flushes_in_order_once_open() {
        let mut h = harness(0, ReconnectPolicy::default());
        h.client.send("a");
        h.client.send("b");
        assert_eq!(h.client.queued(), 2);

        assert!(h.client.connect());
        assert_eq!(h.sent.recv().await.unwrap(), "a");
        assert_eq!(h.sent.recv().await.unwrap(), "b");

        h.client.send("c");
        assert_eq!(h.sent.recv().await.unwrap(), "c");
        assert_eq!(h.client.queued(), 0);

        h.client.disconnect().await;
    }

    #[tokio::test]
    async fn test_connect_twice_is_noop() {
        let h = harness(0, ReconnectPolicy::default());
        assert!(h.client.connect());
        assert!(!h.client.connect());
        wait_for(&h.client, ConnectionState::Open).await;
        assert_eq!(h.connects.load(Ordering::SeqCst), 1);
        h.client.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_between_attempts() {
        let h = harness(3, ReconnectPolicy::default());
        let start = Instant::now();
        h.client.connect();
        wait_for(&h.client, ConnectionState::Open).await;

        // 1s + 2s + 4s
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(7) && elapsed < Duration::from_secs(8));
        assert_eq!(h.connects.load(Ordering::SeqCst), 4);
        h.client.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let h = harness(u32::MAX, ReconnectPolicy::default().max_attempts(3));
        h.client.connect();
        wait_for(&h.client, ConnectionState::Failed).await;
        assert_eq!(h.connects.load(Ordering::SeqCst), 4);

        // The finished task does not block a new connect
        assert!(h.client.connect());
        h.client.disconnect().await;
    }

    #[tokio::test]
    async fn test_inbound_frames_are_broadcast() {
        let h = harness(0, ReconnectPolicy::default());
        let mut events = h.client.subscribe();
        h.client.connect();

        h.inbound.send("garbage".into()).unwrap();
        h.inbound
            .send(r#"{"type":"RELANCE_REQUISE","factureId":7}"#.into())
            .unwrap();

        let n = events.recv().await.unwrap();
        assert_eq!(n.kind, NotificationKind::RelanceRequise);
        assert_eq!(n.get("factureId"), Some(&serde_json::json!(7)));
        h.client.disconnect().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_connection_reconnects_and_keeps_queue() {
        let mut h = harness(0, ReconnectPolicy::default());
        h.client.connect();
        wait_for(&h.client, ConnectionState::Open).await;

        // Peer closes: the second connection has no inbound feed
        drop(h.inbound);
        wait_for(&h.client, ConnectionState::Reconnecting { attempt: 1 }).await;
        h.client.send("pending");
        assert_eq!(h.client.queued(), 1);

        wait_for(&h.client, ConnectionState::Open).await;
        assert_eq!(h.sent.recv().await.unwrap(), "pending");
        assert_eq!(h.connects.load(Ordering::SeqCst), 2);
        h.client.disconnect().await;
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent_and_keeps_queue() {
        let h = harness(0, ReconnectPolicy::default());
        h.client.disconnect().await;
        h.client.connect();
        wait_for(&h.client, ConnectionState::Open).await;

        h.client.disconnect().await;
        h.client.disconnect().await;
        assert_eq!(h.client.state(), ConnectionState::Disconnected);

        h.client.send("later");
        assert_eq!(h.client.queued(), 1);
    }
}
