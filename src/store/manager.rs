//! Data store connection lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use url::Url;

use crate::config::StoreConfig;

/// State of the single data store session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Disconnected,
    Connecting,
    Connected,
}

impl StoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreState::Disconnected => "disconnected",
            StoreState::Connecting => "connecting",
            StoreState::Connected => "connected",
        }
    }
}

impl std::fmt::Display for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle notification for external observers (health checks, logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Connected,
    Disconnected,
}

/// Error type for the single connect attempt. Fatal for the bootstrap;
/// the manager itself only reports it.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid store address {url}: {reason}")]
    Address { url: String, reason: String },

    #[error("connect failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    #[error("store connection already established")]
    AlreadyConnected,
}

/// Shared read-only view of the store session. Handlers receive this
/// behind an `Arc`; all mutation stays inside the manager.
#[derive(Debug)]
pub struct StoreHandle {
    peer_addr: SocketAddr,
    state_rx: watch::Receiver<StoreState>,
}

impl StoreHandle {
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn state(&self) -> StoreState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == StoreState::Connected
    }
}

/// Owner of the data store connection lifecycle.
///
/// `connect` performs the one permitted attempt; afterwards a monitor task
/// watches the transport and publishes `Disconnected` when it drops.
#[derive(Debug)]
pub struct StoreManager {
    state_tx: watch::Sender<StoreState>,
    events_tx: broadcast::Sender<StoreEvent>,
}

impl StoreManager {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(StoreState::Disconnected);
        let (events_tx, _) = broadcast::channel(16);
        Self {
            state_tx,
            events_tx,
        }
    }

    /// Subscribe to lifecycle notifications. Subscribe before calling
    /// `connect` to observe the `Connected` event.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    pub fn state(&self) -> StoreState {
        *self.state_tx.borrow()
    }

    /// Attempt the single connection to the data store.
    ///
    /// Blocks the calling sequence until the transport is established or
    /// the attempt fails. No retry, no backoff: the caller treats failure
    /// as unrecoverable for this process.
    pub async fn connect(&self, config: &StoreConfig) -> Result<Arc<StoreHandle>, ConnectError> {
        if self.state() != StoreState::Disconnected {
            return Err(ConnectError::AlreadyConnected);
        }

        let endpoint = endpoint(&config.url)?;
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        self.state_tx.send_replace(StoreState::Connecting);
        tracing::info!(endpoint = %endpoint, "connecting to data store");

        let attempt = tokio::time::timeout(connect_timeout, TcpStream::connect(endpoint.as_str()));
        let stream = match attempt.await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                self.state_tx.send_replace(StoreState::Disconnected);
                return Err(ConnectError::Io(e));
            }
            Err(_) => {
                self.state_tx.send_replace(StoreState::Disconnected);
                return Err(ConnectError::Timeout(connect_timeout));
            }
        };

        let peer_addr = match stream.peer_addr() {
            Ok(addr) => addr,
            Err(e) => {
                self.state_tx.send_replace(StoreState::Disconnected);
                return Err(ConnectError::Io(e));
            }
        };

        self.state_tx.send_replace(StoreState::Connected);
        let _ = self.events_tx.send(StoreEvent::Connected);
        tracing::info!(peer = %peer_addr, "data store connected");

        tokio::spawn(monitor_transport(
            stream,
            self.state_tx.clone(),
            self.events_tx.clone(),
        ));

        Ok(Arc::new(StoreHandle {
            peer_addr,
            state_rx: self.state_tx.subscribe(),
        }))
    }
}

impl Default for StoreManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Watch the transport until it drops, then publish the loss. The stream
/// lives here so handlers can never touch it.
async fn monitor_transport(
    mut stream: TcpStream,
    state_tx: watch::Sender<StoreState>,
    events_tx: broadcast::Sender<StoreEvent>,
) {
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf).await {
            // EOF: peer closed the session.
            Ok(0) => break,
            // Inbound store chatter is not part of this core; discard.
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "data store transport error");
                break;
            }
        }
    }

    state_tx.send_replace(StoreState::Disconnected);
    let _ = events_tx.send(StoreEvent::Disconnected);
    tracing::warn!("data store disconnected");
}

fn endpoint(url: &Url) -> Result<String, ConnectError> {
    let host = url.host_str().ok_or_else(|| ConnectError::Address {
        url: url.to_string(),
        reason: "missing host".to_string(),
    })?;
    let port = url.port().ok_or_else(|| ConnectError::Address {
        url: url.to_string(),
        reason: "missing explicit port".to_string(),
    })?;
    Ok(format!("{host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::sync::broadcast::error::TryRecvError;

    fn store_config(url: &str) -> StoreConfig {
        StoreConfig {
            url: Url::parse(url).unwrap(),
            connect_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn connect_success_publishes_state_and_one_event() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let manager = StoreManager::new();
        let mut events = manager.subscribe();

        let handle = manager
            .connect(&store_config(&format!("tcp://{addr}")))
            .await
            .unwrap();

        assert_eq!(manager.state(), StoreState::Connected);
        assert!(handle.is_connected());
        assert_eq!(handle.peer_addr(), addr);
        assert_eq!(events.try_recv().unwrap(), StoreEvent::Connected);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn connect_refused_is_an_error() {
        let manager = StoreManager::new();
        let err = manager
            .connect(&store_config("tcp://127.0.0.1:1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectError::Io(_)));
        assert_eq!(manager.state(), StoreState::Disconnected);
    }

    #[tokio::test]
    async fn second_connect_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = store_config(&format!("tcp://{addr}"));

        let manager = StoreManager::new();
        manager.connect(&config).await.unwrap();
        let err = manager.connect(&config).await.unwrap_err();
        assert!(matches!(err, ConnectError::AlreadyConnected));
    }

    #[tokio::test]
    async fn transport_loss_emits_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let manager = StoreManager::new();
        let handle = manager
            .connect(&store_config(&format!("tcp://{addr}")))
            .await
            .unwrap();
        let mut events = manager.subscribe();

        // Accept and immediately drop the server side of the session.
        let (server_side, _) = listener.accept().await.unwrap();
        drop(server_side);

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no disconnect observed")
            .unwrap();
        assert_eq!(event, StoreEvent::Disconnected);
        assert_eq!(handle.state(), StoreState::Disconnected);
    }

    #[tokio::test]
    async fn url_without_port_is_rejected() {
        let manager = StoreManager::new();
        let err = manager
            .connect(&store_config("tcp://127.0.0.1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::Address { .. }));
    }
}
