//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use url::Url;

use bookingd::config::{
    LimitsConfig, ListenerConfig, ReadinessConfig, ServerConfig, StoreConfig, TimeoutConfig,
};

enum Cmd {
    DropAll,
}

/// A mock data store: accepts connections and holds them open until told
/// to drop them (simulating transport loss) or until it is itself dropped.
pub struct MockStore {
    addr: SocketAddr,
    cmd_tx: mpsc::UnboundedSender<Cmd>,
}

impl MockStore {
    pub fn url(&self) -> String {
        format!("tcp://{}", self.addr)
    }

    /// Sever every held connection, as a crashed store would.
    #[allow(dead_code)]
    pub fn drop_connections(&self) {
        let _ = self.cmd_tx.send(Cmd::DropAll);
    }
}

pub async fn start_mock_store() -> MockStore {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut held: Vec<TcpStream> = Vec::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => held.push(stream),
                    Err(_) => break,
                },
                cmd = cmd_rx.recv() => match cmd {
                    Some(Cmd::DropAll) => held.clear(),
                    None => break,
                },
            }
        }
    });

    MockStore { addr, cmd_tx }
}

/// Config bound to an ephemeral local port, pointing at the given store.
pub fn test_config(store_url: &str) -> ServerConfig {
    ServerConfig {
        listener: ListenerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_connections: 64,
        },
        store: StoreConfig {
            url: Url::parse(store_url).unwrap(),
            connect_timeout_secs: 5,
        },
        timeouts: TimeoutConfig { request_secs: 10 },
        limits: LimitsConfig {
            max_body_bytes: 1024 * 1024,
        },
        readiness: ReadinessConfig {
            require_store_ready: false,
        },
    }
}

/// Reserve an ephemeral port: bind, read the assigned port, release.
/// The OS will not hand the same port out again right away, so a server
/// started immediately afterwards can claim it.
#[allow(dead_code)]
pub fn reserve_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Non-pooled client so closed test servers are not revisited.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
