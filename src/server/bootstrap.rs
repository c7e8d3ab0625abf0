//! Server bootstrap: sequencing, phases, readiness.
//!
//! # Responsibilities
//! - Bind the bounded listener and spawn the serve task
//! - Sequence "begin accepting" against "data store ready"
//! - Publish phases so callers and tests can observe readiness
//!
//! # Design Decisions
//! - `start` blocks until the store connect resolves; failure is returned
//!   as a typed error and the process-exit decision stays with the caller
//! - Relaxed by default: requests arriving before `Ready` are dispatched
//!   normally; `require_store_ready` connects before the listener binds

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::net::{BoundedListener, ListenerError};
use crate::routing::Router;
use crate::server::app::{build_app, AppState};
use crate::server::shutdown::Shutdown;
use crate::store::{ConnectError, StoreEvent, StoreHandle, StoreManager};

/// Bootstrap phase machine.
///
/// `Ready` is composite: accepting connections AND the data store
/// confirmed connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Listening,
    Ready,
    ShuttingDown,
    Stopped,
}

/// Fatal startup error. The caller decides whether to exit the process.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("listener: {0}")]
    Listen(#[from] ListenerError),

    #[error("data store: {0}")]
    Connect(#[from] ConnectError),
}

/// A configured server, not yet started.
pub struct Server {
    config: ServerConfig,
    router: Router,
    manager: Arc<StoreManager>,
    phase_tx: watch::Sender<Phase>,
}

impl Server {
    /// Wire a server from its three explicit inputs. The route table is
    /// structurally frozen from here on.
    pub fn new(config: ServerConfig, router: Router, manager: Arc<StoreManager>) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Configuring);
        Self {
            config,
            router,
            manager,
            phase_tx,
        }
    }

    /// Observe phase transitions. Useful before `start` to watch the
    /// bootstrap sequence itself.
    pub fn phases(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    /// Run the bootstrap sequence.
    ///
    /// Relaxed (default): bind → accept traffic → connect store → `Ready`.
    /// Strict (`require_store_ready`): connect store → bind → `Ready`.
    pub async fn start(self) -> Result<ServerHandle, StartError> {
        let Server {
            config,
            router,
            manager,
            phase_tx,
        } = self;

        let mut store = None;
        if config.readiness.require_store_ready {
            store = match manager.connect(&config.store).await {
                Ok(handle) => Some(handle),
                Err(e) => {
                    phase_tx.send_replace(Phase::Stopped);
                    return Err(StartError::Connect(e));
                }
            };
        }

        let listener = BoundedListener::bind(&config.listener).await?;
        let local_addr = listener.local_addr();
        phase_tx.send_replace(Phase::Listening);
        tracing::info!(address = %local_addr, "listening for connections");

        let state = AppState {
            routes: Arc::new(router),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let app = build_app(state, &config.timeouts);

        let shutdown = Shutdown::new();
        let drain = shutdown.triggered();
        let serve_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(drain)
                .await
            {
                tracing::error!(error = %e, "http server error");
            }
        });

        let store = match store {
            Some(handle) => handle,
            None => match manager.connect(&config.store).await {
                Ok(handle) => handle,
                Err(e) => {
                    // Fail fast: a server without its data store must not
                    // keep accepting domain requests.
                    shutdown.trigger();
                    let _ = serve_task.await;
                    phase_tx.send_replace(Phase::Stopped);
                    return Err(StartError::Connect(e));
                }
            },
        };

        phase_tx.send_replace(Phase::Ready);
        tracing::info!(store_peer = %store.peer_addr(), "server ready");

        Ok(ServerHandle {
            local_addr,
            phase_tx,
            store,
            manager,
            shutdown,
            serve_task,
        })
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    phase_tx: watch::Sender<Phase>,
    store: Arc<StoreHandle>,
    manager: Arc<StoreManager>,
    shutdown: Shutdown,
    serve_task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn phase(&self) -> Phase {
        *self.phase_tx.borrow()
    }

    pub fn phase_changes(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    /// The shared read-only store session.
    pub fn store(&self) -> &Arc<StoreHandle> {
        &self.store
    }

    /// Lifecycle notifications emitted after this call.
    pub fn subscribe_store_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.manager.subscribe()
    }

    /// Drain in-flight requests and stop.
    pub async fn shutdown(self) {
        tracing::info!("shutting down");
        self.phase_tx.send_replace(Phase::ShuttingDown);
        self.shutdown.trigger();
        if let Err(e) = self.serve_task.await {
            tracing::warn!(error = %e, "serve task ended abnormally");
        }
        self.phase_tx.send_replace(Phase::Stopped);
        tracing::info!("server stopped");
    }
}
