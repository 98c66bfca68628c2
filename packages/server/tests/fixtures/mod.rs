//! Test fixtures for integration tests.
//!
//! Each `TestServer` runs the full router in-process on an ephemeral port
//! with its own upload directory.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{ServerConfig, ui, ui::state::AppState};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub struct TestServer {
    pub port: u16,
    _upload_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start with a config adjusted by `configure`
    pub async fn start_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let port = listener.local_addr().expect("No local addr").port();

        let mut config = ServerConfig {
            port,
            upload_dir: upload_dir.path().to_path_buf(),
            send_timeout_ms: 1_000,
            ..ServerConfig::default()
        };
        configure(&mut config);
        let state = Arc::new(AppState::new(config));
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = rx.await;
            };
            if let Err(e) = ui::serve(listener, state, shutdown).await {
                eprintln!("test server stopped: {e}");
            }
        });

        Self {
            port,
            _upload_dir: upload_dir,
            shutdown: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    pub async fn connect(&self) -> TestClient {
        let (stream, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect");
        TestClient { stream }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn send_json(&mut self, value: Value) {
        self.stream
            .send(Message::Text(value.to_string().into()))
            .await
            .expect("Failed to send");
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("Failed to send");
    }

    pub async fn join(&mut self, username: &str, room_name: &str) -> Value {
        self.send_json(json!({
            "type": "join-room",
            "username": username,
            "room_name": room_name,
        }))
        .await;
        let joined = self.recv_type("joined").await;
        // room-users, own notice, history
        self.recv_type("message-history").await;
        joined
    }

    /// Next JSON frame, failing after a timeout
    pub async fn recv(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                .await
                .expect("Timed out waiting for frame")
                .expect("Stream ended")
                .expect("WebSocket error");
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
            }
        }
    }

    /// Skip frames until one of the given type arrives
    pub async fn recv_type(&mut self, kind: &str) -> Value {
        loop {
            let frame = self.recv().await;
            if frame["type"] == kind {
                return frame;
            }
        }
    }

    /// Assert nothing arrives for a short while
    pub async fn expect_silence(&mut self) {
        let result = tokio::time::timeout(Duration::from_millis(200), self.stream.next()).await;
        assert!(result.is_err(), "Unexpected frame: {result:?}");
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// Poll until `check` passes or a timeout elapses
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..50 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("Condition not met in time");
}
