//! Program log subscriptions feeding the event dispatch table

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use solana_client::{
    nonblocking::pubsub_client::PubsubClient,
    rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter},
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::events::{dispatch_notification, EventHandler, EventKind, LogNotification};
use crate::shared::errors::ClientError;

pub type ListenerId = u64;

const RECONNECT_BACKOFF_MIN: Duration = Duration::from_millis(500);
const RECONNECT_BACKOFF_MAX: Duration = Duration::from_secs(30);

struct ListenerHandle {
    kind: EventKind,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

type ListenerMap = Arc<Mutex<HashMap<ListenerId, ListenerHandle>>>;

/// Why a listener loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerExit {
    Shutdown,
    StreamClosed,
}

/// Live listeners, one subscription task each
pub struct EventListenerRegistry {
    next_id: AtomicU64,
    listeners: ListenerMap,
}

impl Default for EventListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Open a `logsSubscribe` for transactions mentioning `program_id` and
    /// deliver every `kind` event it emits to `handler`.
    ///
    /// Returns once the first subscription is acknowledged. If the websocket
    /// drops later, the task reconnects with backoff until removed.
    pub async fn subscribe(
        &self,
        ws_url: &str,
        program_id: Pubkey,
        kind: EventKind,
        handler: EventHandler,
        commitment: CommitmentConfig,
    ) -> Result<ListenerId, ClientError> {
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), ClientError>>();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let ws_url = ws_url.to_string();

        let task = tokio::spawn(async move {
            let mut ready = Some(ready_tx);
            let mut backoff = RECONNECT_BACKOFF_MIN;

            loop {
                let client = match PubsubClient::new(&ws_url).await {
                    Ok(client) => client,
                    Err(e) => match ready.take() {
                        Some(ready) => {
                            let _ = ready.send(Err(e.into()));
                            return;
                        }
                        None => {
                            warn!("🔌 {} reconnect failed: {}, retrying in {:?}", kind, e, backoff);
                            if backoff_or_shutdown(&mut shutdown_rx, backoff).await {
                                return;
                            }
                            backoff = next_backoff(backoff);
                            continue;
                        }
                    },
                };

                let subscription = client
                    .logs_subscribe(
                        RpcTransactionLogsFilter::Mentions(vec![program_id.to_string()]),
                        RpcTransactionLogsConfig {
                            commitment: Some(commitment),
                        },
                    )
                    .await;
                let (stream, unsubscribe) = match subscription {
                    Ok(subscription) => subscription,
                    Err(e) => match ready.take() {
                        Some(ready) => {
                            let _ = ready.send(Err(e.into()));
                            return;
                        }
                        None => {
                            warn!("🔌 {} resubscribe failed: {}, retrying in {:?}", kind, e, backoff);
                            if backoff_or_shutdown(&mut shutdown_rx, backoff).await {
                                return;
                            }
                            backoff = next_backoff(backoff);
                            continue;
                        }
                    },
                };
                match ready.take() {
                    Some(ready) => {
                        let _ = ready.send(Ok(()));
                    }
                    None => info!("🔌 {} listener resubscribed", kind),
                }
                backoff = RECONNECT_BACKOFF_MIN;

                let exit = run_listener(
                    kind,
                    program_id,
                    stream.map(LogNotification::from),
                    &handler,
                    &mut shutdown_rx,
                )
                .await;
                unsubscribe().await;
                if exit == ListenerExit::Shutdown {
                    debug!("Unsubscribed {} listener", kind);
                    return;
                }
                if backoff_or_shutdown(&mut shutdown_rx, backoff).await {
                    return;
                }
            }
        });

        match ready_rx.await {
            Ok(Ok(())) => {
                let id = self.next_id();
                self.listeners.lock().await.insert(
                    id,
                    ListenerHandle {
                        kind,
                        shutdown: shutdown_tx,
                        task,
                    },
                );
                info!("👂 Listening for {} (listener {})", kind, id);
                Ok(id)
            }
            Ok(Err(e)) => {
                error!("❌ Failed to subscribe to {}: {}", kind, e);
                Err(e)
            }
            Err(_) => Err(ClientError::Subscription(
                "listener task ended before subscribing".to_string(),
            )),
        }
    }

    /// Attach `handler` to an already open notification stream.
    ///
    /// The stream cannot be reopened, so when it ends the listener removes
    /// itself from the registry.
    pub async fn register_stream<S>(
        &self,
        kind: EventKind,
        program_id: Pubkey,
        stream: S,
        handler: EventHandler,
    ) -> ListenerId
    where
        S: Stream<Item = LogNotification> + Send + Unpin + 'static,
    {
        let id = self.next_id();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let listeners = Arc::clone(&self.listeners);

        // Held across the spawn so the task cannot remove itself before insertion
        let mut map = self.listeners.lock().await;
        let task = tokio::spawn(async move {
            let exit = run_listener(kind, program_id, stream, &handler, &mut shutdown_rx).await;
            if exit == ListenerExit::StreamClosed && listeners.lock().await.remove(&id).is_some() {
                warn!("🔌 {} listener {} dropped: notification stream closed", kind, id);
            }
        });
        map.insert(
            id,
            ListenerHandle {
                kind,
                shutdown: shutdown_tx,
                task,
            },
        );
        id
    }

    fn next_id(&self) -> ListenerId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Stop a listener. Unknown ids are ignored; returns whether one was removed.
    pub async fn remove(&self, id: ListenerId) -> bool {
        let handle = self.listeners.lock().await.remove(&id);
        match handle {
            Some(handle) => {
                let _ = handle.shutdown.send(());
                if let Err(e) = handle.task.await {
                    warn!("⚠️ Listener {} task ended abnormally: {}", id, e);
                }
                info!("🔇 Removed {} listener {}", handle.kind, id);
                true
            }
            None => {
                debug!("No listener with id {}", id);
                false
            }
        }
    }

    pub async fn remove_all(&self) {
        let ids: Vec<ListenerId> = self.listeners.lock().await.keys().copied().collect();
        for id in ids {
            self.remove(id).await;
        }
    }

    /// Whether `id` is still delivering events
    pub async fn is_active(&self, id: ListenerId) -> bool {
        self.listeners.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.listeners.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(RECONNECT_BACKOFF_MAX)
}

/// Sleep for `delay`; true if shutdown was requested meanwhile
async fn backoff_or_shutdown(shutdown: &mut oneshot::Receiver<()>, delay: Duration) -> bool {
    tokio::select! {
        _ = shutdown => true,
        _ = tokio::time::sleep(delay) => false,
    }
}

async fn run_listener<S>(
    kind: EventKind,
    program_id: Pubkey,
    mut stream: S,
    handler: &EventHandler,
    shutdown: &mut oneshot::Receiver<()>,
) -> ListenerExit
where
    S: Stream<Item = LogNotification> + Unpin,
{
    loop {
        tokio::select! {
            _ = &mut *shutdown => return ListenerExit::Shutdown,
            next = stream.next() => match next {
                Some(notification) => {
                    dispatch_notification(kind, &program_id, &notification, handler.as_ref());
                }
                None => {
                    warn!("⚠️ {} notification stream closed", kind);
                    return ListenerExit::StreamClosed;
                }
            },
        }
    }
}
