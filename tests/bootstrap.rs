//! Bootstrap sequencing, readiness and fail-fast tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpSocket, TcpStream};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::timeout;

use bookingd::routes;
use bookingd::routing::Router;
use bookingd::server::{Phase, Server, StartError};
use bookingd::store::{StoreEvent, StoreManager, StoreState};

mod common;

#[tokio::test]
async fn reachable_store_reaches_ready_with_one_connected_event() {
    let store = common::start_mock_store().await;
    let manager = Arc::new(StoreManager::new());
    let mut events = manager.subscribe();

    let server = Server::new(common::test_config(&store.url()), Router::new(), manager);
    let handle = server.start().await.unwrap();

    assert!(handle.is_ready());
    assert_eq!(handle.phase(), Phase::Ready);
    assert_eq!(handle.store().state(), StoreState::Connected);

    assert_eq!(events.try_recv().unwrap(), StoreEvent::Connected);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    handle.shutdown().await;
}

#[tokio::test]
async fn unreachable_store_fails_fast_and_never_reaches_ready() {
    let manager = Arc::new(StoreManager::new());
    let server = Server::new(
        common::test_config("tcp://127.0.0.1:1"),
        Router::new(),
        manager,
    );
    let phases = server.phases();

    let err = server.start().await;
    assert!(matches!(err, Err(StartError::Connect(_))));
    assert_eq!(*phases.borrow(), Phase::Stopped);
}

#[tokio::test]
async fn store_loss_after_startup_is_observed_not_fatal() {
    let store = common::start_mock_store().await;
    let manager = Arc::new(StoreManager::new());

    let mut router = Router::new();
    router
        .mount("/health", routes::health_routes(manager.clone()).unwrap())
        .unwrap();

    let handle = Server::new(common::test_config(&store.url()), router, manager)
        .start()
        .await
        .unwrap();
    let mut events = handle.subscribe_store_events();

    store.drop_connections();

    let event = timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("no disconnect observed")
        .unwrap();
    assert_eq!(event, StoreEvent::Disconnected);
    assert_eq!(handle.store().state(), StoreState::Disconnected);

    // The server keeps serving; the health group now reports degraded.
    let res = common::client()
        .get(format!("http://{}/health", handle.local_addr()))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["ready"], false);

    handle.shutdown().await;
}

#[tokio::test]
async fn strict_readiness_connects_store_first() {
    // Reachable store: strict mode starts normally.
    let store = common::start_mock_store().await;
    let mut config = common::test_config(&store.url());
    config.readiness.require_store_ready = true;

    let handle = Server::new(config, Router::new(), Arc::new(StoreManager::new()))
        .start()
        .await
        .unwrap();
    assert!(handle.is_ready());
    handle.shutdown().await;

    // Unreachable store: the failure precedes any bind, so the phase
    // jumps straight from Configuring to Stopped.
    let mut config = common::test_config("tcp://127.0.0.1:1");
    config.readiness.require_store_ready = true;

    let server = Server::new(config, Router::new(), Arc::new(StoreManager::new()));
    let mut phases = server.phases();
    assert_eq!(*phases.borrow(), Phase::Configuring);

    let err = server.start().await;
    assert!(matches!(err, Err(StartError::Connect(_))));

    phases.changed().await.unwrap();
    assert_eq!(*phases.borrow(), Phase::Stopped);
}

#[tokio::test]
async fn relaxed_mode_serves_requests_before_store_ready() {
    // A listener whose accept backlog is saturated: further connects stay
    // pending, which holds the bootstrap in Listening while the HTTP side
    // is already accepting.
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let stalled = socket.listen(0).unwrap();
    let store_addr = stalled.local_addr().unwrap();

    let mut held = Vec::new();
    for _ in 0..8 {
        match timeout(Duration::from_millis(200), TcpStream::connect(store_addr)).await {
            Ok(Ok(stream)) => held.push(stream),
            _ => break,
        }
    }

    let port = common::reserve_port();
    let mut config = common::test_config(&format!("tcp://{store_addr}"));
    config.listener.port = port;
    config.store.connect_timeout_secs = 30;

    let mut router = Router::new();
    router.mount("/auth", routes::auth_routes().unwrap()).unwrap();

    let server = Server::new(config, router, Arc::new(StoreManager::new()));
    let mut phases = server.phases();
    let start_task = tokio::spawn(server.start());

    {
        let phase = timeout(
            Duration::from_secs(5),
            phases.wait_for(|p| *p != Phase::Configuring),
        )
        .await
        .expect("listener never came up")
        .unwrap();
        // Not yet ready: the store connect is still pending.
        assert_eq!(*phase, Phase::Listening);
    }
    let res = common::client()
        .get(format!("http://127.0.0.1:{port}/auth/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(*phases.borrow(), Phase::Listening);

    start_task.abort();
    drop(held);
}
