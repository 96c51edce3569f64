//! # Runtime Wiring Tests
//!
//! Builds the full runtime against a local websocket feed. The ledger store
//! is never reached in these scenarios, so no database is needed.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use shared_types::ProtocolVersion;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use updater_runtime::{ProcessExit, RuntimeError, UpdaterConfig, UpdaterRuntime, FATAL_EXIT_CODE};

#[derive(Default)]
struct RecordingExit {
    codes: Mutex<Vec<i32>>,
}

impl ProcessExit for RecordingExit {
    fn exit(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}

fn config(indexer_ws_url: String, version: ProtocolVersion) -> UpdaterConfig {
    UpdaterConfig {
        indexer_ws_url,
        indexer_db_connection_string: "host=127.0.0.1 port=1 user=nobody dbname=none".into(),
        pathfinder_rpc_url: "http://127.0.0.1:1".into(),
        internal_capacity_graph_path: PathBuf::from("/tmp/pu-wiring-test.db"),
        external_capacity_graph_path: "/tmp/pu-wiring-test.db".into(),
        version,
        health_bind_address: "127.0.0.1:0".parse().unwrap(),
        periodic_update_interval: Duration::from_secs(60),
        pathfinder_reload_method: "load_edges_binary".into(),
        pathfinder_rpc_timeout: Some(Duration::from_secs(1)),
    }
}

#[tokio::test]
async fn test_malformed_feed_message_exits_with_fatal_code() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text("this is not json".into())).await.unwrap();
        // Drain until the client goes away
        while let Some(Ok(_)) = ws.next().await {}
    });

    let exit = Arc::new(RecordingExit::default());
    let runtime = UpdaterRuntime::with_exit(config(url, ProtocolVersion::V1), exit.clone()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(10), runtime.run())
        .await
        .unwrap();

    assert!(matches!(result, Err(RuntimeError::Subscription(_))));
    assert_eq!(*exit.codes.lock().unwrap(), vec![FATAL_EXIT_CODE]);
    server.abort();
}

#[tokio::test]
async fn test_shutdown_handle_stops_cleanly() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        // v2 clients subscribe first
        let subscribe = ws.next().await.unwrap().unwrap();
        assert!(subscribe.to_text().unwrap().contains("eth_subscribe"));
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
    });

    let exit = Arc::new(RecordingExit::default());
    let runtime = UpdaterRuntime::with_exit(config(url, ProtocolVersion::V2), exit.clone()).unwrap();
    let handle = runtime.shutdown_handle();
    let run = tokio::spawn(runtime.run());

    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert!(exit.codes.lock().unwrap().is_empty());
    server.await.unwrap();
}

#[test]
fn test_invalid_connection_string_fails_build() {
    let mut config = config("ws://127.0.0.1:1".into(), ProtocolVersion::V1);
    config.indexer_db_connection_string = "host='unterminated".into();
    let result = UpdaterRuntime::with_exit(config, Arc::new(RecordingExit::default()));
    assert!(matches!(result, Err(RuntimeError::Store(_))));
}
