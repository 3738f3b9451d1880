//! Reconnecting WebSocket listener for analysis notifications
//!
//! A single tokio task owns the socket. When the connection closes or
//! fails, the task waits a fixed delay and reconnects, forever: there is no
//! backoff growth and no retry cap. Because one task owns the only
//! connection, a reconnect can never leave two sockets open in parallel.
//!
//! The loop ends only when its [`CancellationToken`] is cancelled (the
//! owning dashboard context is torn down) or when nobody is left to receive
//! events.

use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::NotificationConfig;
use crate::error::{Result, VoxdashError};
use crate::notify::{parse_notification, Notification};

/// Buffered analysis payloads before the socket read pauses
const EVENT_BUFFER: usize = 32;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connection stopped being read
#[derive(Debug)]
enum Disconnect {
    Cancelled,
    ReceiverDropped,
    Closed,
    Failed(tokio_tungstenite::tungstenite::Error),
}

/// Per-user notification listener configuration.
///
/// # Examples
///
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use voxdash::config::NotificationConfig;
/// use voxdash::notify::NotificationListener;
///
/// # async fn example() -> voxdash::error::Result<()> {
/// let listener = NotificationListener::new(&NotificationConfig::default(), Some(7))?;
/// let mut handle = listener.spawn(CancellationToken::new());
/// while let Some(analysis) = handle.recv().await {
///     println!("analysis ready: {analysis}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NotificationListener {
    url: String,
    reconnect_delay: Duration,
}

impl NotificationListener {
    /// Listener for `user_id` at `{ws_base_url}/api/ws/{user_id}`
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Notification` when there is no user to listen
    /// for
    pub fn new(config: &NotificationConfig, user_id: Option<i64>) -> Result<Self> {
        let user_id = user_id.ok_or_else(|| {
            VoxdashError::Notification("Cannot listen without a logged-in user".to_string())
        })?;

        let url = format!(
            "{}/api/ws/{}",
            config.ws_base_url.trim_end_matches('/'),
            user_id
        );
        Ok(Self::with_url(
            url,
            Duration::from_millis(config.reconnect_delay_ms),
        ))
    }

    /// Listener for an explicit socket URL
    pub fn with_url(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
        }
    }

    /// Socket URL this listener connects to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start the listener task.
    ///
    /// Cancelling `cancel` (or calling [`ListenerHandle::shutdown`]) stops
    /// the task and closes any open socket.
    pub fn spawn(self, cancel: CancellationToken) -> ListenerHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (connected_tx, connected_rx) = watch::channel(false);

        let task = tokio::spawn(self.run(events_tx, connected_tx, cancel.clone()));

        ListenerHandle {
            events: events_rx,
            connected: connected_rx,
            cancel,
            task,
        }
    }

    /// Connect, read, and reconnect until cancelled.
    pub async fn run(
        self,
        events: mpsc::Sender<Value>,
        connected: watch::Sender<bool>,
        cancel: CancellationToken,
    ) {
        tracing::info!(url = %self.url, "Notification listener started");

        loop {
            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                attempt = connect_async(self.url.as_str()) => attempt,
            };

            match attempt {
                Ok((socket, _response)) => {
                    tracing::info!("Notification channel connected");
                    connected.send_replace(true);
                    let disconnect = read_socket(socket, &events, &cancel).await;
                    connected.send_replace(false);

                    match disconnect {
                        Disconnect::Cancelled | Disconnect::ReceiverDropped => break,
                        Disconnect::Closed => tracing::info!("Notification channel closed"),
                        Disconnect::Failed(e) => {
                            tracing::error!("Notification channel error: {}", e)
                        }
                    }
                }
                Err(e) => tracing::warn!("Notification channel connect failed: {}", e),
            }

            tracing::debug!(delay = ?self.reconnect_delay, "Reconnecting notification channel");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        connected.send_replace(false);
        tracing::info!("Notification listener stopped");
    }
}

async fn read_socket(
    mut socket: Socket,
    events: &mpsc::Sender<Value>,
    cancel: &CancellationToken,
) -> Disconnect {
    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                if let Err(e) = socket.close(None).await {
                    tracing::debug!("Error closing notification channel: {}", e);
                }
                return Disconnect::Cancelled;
            }
            frame = socket.next() => frame,
        };

        match frame {
            None => return Disconnect::Closed,
            Some(Err(e)) => return Disconnect::Failed(e),
            Some(Ok(Message::Close(_))) => return Disconnect::Closed,
            Some(Ok(Message::Text(text))) => match parse_notification(text.as_str()) {
                Ok(Notification::LlmAnalysisComplete(data)) => {
                    tracing::info!("LLM analysis complete notification received");
                    if events.send(data).await.is_err() {
                        tracing::debug!("Notification receiver dropped");
                        return Disconnect::ReceiverDropped;
                    }
                }
                Ok(Notification::Unknown(kind)) => {
                    tracing::info!(
                        "Ignoring unknown message type: {}",
                        kind.as_deref().unwrap_or("<none>")
                    );
                }
                Err(e) => tracing::error!("Failed to handle notification frame: {:#}", e),
            },
            Some(Ok(_)) => {}
        }
    }
}

/// Owner-side handle of a running listener.
///
/// Dropping the handle drops the event receiver, which stops the task the
/// next time it tries to deliver an event. Call [`shutdown`](Self::shutdown)
/// to stop it immediately.
#[derive(Debug)]
pub struct ListenerHandle {
    events: mpsc::Receiver<Value>,
    connected: watch::Receiver<bool>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Next analysis payload; `None` once the listener has stopped
    pub async fn recv(&mut self) -> Option<Value> {
        self.events.recv().await
    }

    /// Whether a socket is currently open
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Receiver that observes connection state changes
    pub fn connection_state(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Cancel the listener and wait for its task to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("Notification listener task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_user_id() {
        let err = NotificationListener::new(&NotificationConfig::default(), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VoxdashError>(),
            Some(VoxdashError::Notification(_))
        ));
    }

    #[test]
    fn test_new_builds_user_url_and_delay() {
        let config = NotificationConfig {
            ws_base_url: "ws://dash.local:8000/".to_string(),
            reconnect_delay_ms: 3000,
        };
        let listener = NotificationListener::new(&config, Some(42)).unwrap();
        assert_eq!(listener.url(), "ws://dash.local:8000/api/ws/42");
        assert_eq!(listener.reconnect_delay, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_shutdown_stops_retry_loop() {
        // Nothing listens on port 9 (discard) in the test environment.
        let listener =
            NotificationListener::with_url("ws://127.0.0.1:9/api/ws/1", Duration::from_millis(20));
        let handle = listener.spawn(CancellationToken::new());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!handle.is_connected());
        tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
            .await
            .expect("listener should stop promptly after cancellation");
    }
}
