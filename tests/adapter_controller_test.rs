use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use tui_match3::adapter::protocol::{create_ack, create_action_command, create_hello, ActionName};
use tui_match3::adapter::server::{run_server, ServerConfig};
use tui_match3::adapter::{AdapterStats, InboundCommand, InboundPayload, OutboundMessage};

struct Client {
    lines: tokio::io::Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send_raw(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn send<T: serde::Serialize>(&mut self, msg: &T) {
        self.send_raw(&serde_json::to_string(msg).unwrap()).await;
    }

    async fn next(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timeout waiting for line")
            .expect("io error")
    }

    async fn recv(&mut self) -> serde_json::Value {
        serde_json::from_str(&self.next().await.expect("expected line")).unwrap()
    }

    /// Handshake without observation streaming.
    async fn hello(&mut self, seq: u64, name: &str) -> serde_json::Value {
        let mut hello = create_hello(seq, name, "1.0.0");
        hello.requested.stream_observations = false;
        self.send(&hello).await;
        let welcome = self.recv().await;
        assert_eq!(welcome["type"], "welcome", "expected welcome, got {welcome}");
        welcome
    }

    async fn hint(&mut self, seq: u64) -> serde_json::Value {
        self.send(&create_action_command(seq, ActionName::Hint)).await;
        self.recv().await
    }
}

/// Server whose game loop acks every command.
async fn start(max_pending_commands: usize) -> (std::net::SocketAddr, Arc<AdapterStats>) {
    start_with(max_pending_commands, true).await
}

async fn start_with(
    max_pending_commands: usize,
    drain: bool,
) -> (std::net::SocketAddr, Arc<AdapterStats>) {
    let config = ServerConfig {
        port: 0,
        max_pending_commands,
        ..ServerConfig::default()
    };
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(max_pending_commands);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();
    let stats = Arc::new(AdapterStats::default());

    let server_stats = Arc::clone(&stats);
    tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx), Some(server_stats)).await;
    });

    tokio::spawn(async move {
        if !drain {
            // Hold the queue without ever reading it.
            let _keep = cmd_rx;
            std::future::pending::<()>().await;
            return;
        }
        while let Some(inbound) = cmd_rx.recv().await {
            if matches!(inbound.payload, InboundPayload::Command(_)) {
                let _ = out_tx.send(OutboundMessage::ToClientAck {
                    client_id: inbound.client_id,
                    ack: create_ack(inbound.seq),
                });
            }
        }
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();
    (addr, stats)
}

#[tokio::test]
async fn first_hello_becomes_controller_others_observe() {
    let (addr, stats) = start(8).await;

    let mut a = Client::connect(addr).await;
    let welcome = a.hello(1, "a").await;
    assert_eq!(welcome["role"], "controller");

    let mut b = Client::connect(addr).await;
    let welcome = b.hello(1, "b").await;
    assert_eq!(welcome["role"], "observer");
    assert_eq!(welcome["controller_id"], 1);

    let resp = b.hint(2).await;
    assert_eq!(resp["type"], "error");
    assert_eq!(resp["code"], "not_controller");
    assert_eq!(resp["seq"], 2);

    let resp = a.hint(2).await;
    assert_eq!(resp["type"], "ack");

    assert_eq!(stats.client_count(), 2);
    assert_eq!(stats.controller_id(), Some(1));
}

#[tokio::test]
async fn controller_disconnect_promotes_oldest_client() {
    let (addr, stats) = start(8).await;

    let mut a = Client::connect(addr).await;
    a.hello(1, "a").await;
    let mut b = Client::connect(addr).await;
    b.hello(1, "b").await;
    let mut c = Client::connect(addr).await;
    c.hello(1, "c").await;

    drop(a);
    // Give the server a moment to observe the disconnect and run cleanup.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(stats.controller_id(), Some(2));
    assert_eq!(stats.client_count(), 2);

    let resp = c.hint(2).await;
    assert_eq!(resp["code"], "not_controller");
    let resp = b.hint(2).await;
    assert_eq!(resp["type"], "ack", "expected ack, got {resp}");
}

#[tokio::test]
async fn last_client_leaving_releases_control() {
    let (addr, stats) = start(8).await;
    {
        let mut a = Client::connect(addr).await;
        a.hello(1, "a").await;
        // Invalid UTF-8 forces a read error instead of a clean EOF.
        a.writer.write_all(&[0xFF, b'\n']).await.unwrap();
        let _ = a.writer.flush().await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(stats.controller_id(), None);
    assert_eq!(stats.client_count(), 0);

    let mut b = Client::connect(addr).await;
    let welcome = b.hello(1, "b").await;
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["client_id"], 2);
}

#[tokio::test]
async fn command_before_hello_requires_handshake() {
    let (addr, _) = start(8).await;
    let mut a = Client::connect(addr).await;
    let resp = a.hint(5).await;
    assert_eq!(resp["type"], "error");
    assert_eq!(resp["code"], "handshake_required");
    assert_eq!(resp["seq"], 5);
}

#[tokio::test]
async fn seq_must_strictly_increase() {
    let (addr, _) = start(8).await;
    let mut a = Client::connect(addr).await;
    a.hello(10, "a").await;

    let resp = a.hint(10).await;
    assert_eq!(resp["code"], "invalid_command");
    let resp = a.hint(9).await;
    assert_eq!(resp["code"], "invalid_command");
    let resp = a.hint(11).await;
    assert_eq!(resp["type"], "ack");
    let resp = a.hint(11).await;
    assert_eq!(resp["code"], "invalid_command");
}

#[tokio::test]
async fn protocol_mismatch_closes_the_connection() {
    let (addr, stats) = start(8).await;
    let mut a = Client::connect(addr).await;
    a.send(&create_hello(1, "old", "2.0.0")).await;

    let resp = a.recv().await;
    assert_eq!(resp["type"], "error");
    assert_eq!(resp["code"], "protocol_mismatch");
    assert!(a.next().await.is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(stats.controller_id(), None);
}

#[tokio::test]
async fn malformed_and_unknown_messages_are_invalid_commands() {
    let (addr, _) = start(8).await;
    let mut a = Client::connect(addr).await;
    a.hello(1, "a").await;

    a.send_raw(r#"{"type":"dance","seq":4}"#).await;
    let resp = a.recv().await;
    assert_eq!(resp["code"], "invalid_command");
    assert_eq!(resp["seq"], 4);

    a.send_raw(r#"{"type":"command","seq":7,"swap":"#).await;
    let resp = a.recv().await;
    assert_eq!(resp["code"], "invalid_command");
    assert_eq!(resp["seq"], 7);

    // Swap and action together.
    a.send_raw(r#"{"type":"command","seq":8,"swap":{"from":[0,0],"to":[0,1]},"action":"hint"}"#)
        .await;
    let resp = a.recv().await;
    assert_eq!(resp["code"], "invalid_command");
    assert_eq!(resp["seq"], 8);

    // Still usable afterwards.
    assert_eq!(a.hint(9).await["type"], "ack");
}

#[tokio::test]
async fn full_queue_answers_backpressure() {
    let (addr, _) = start_with(1, false).await;
    let mut a = Client::connect(addr).await;
    a.hello(1, "a").await;

    // The first command fills the queue; nobody drains it.
    a.send(&create_action_command(2, ActionName::Hint)).await;
    a.send(&create_action_command(3, ActionName::Hint)).await;
    let resp = a.recv().await;
    assert_eq!(resp["type"], "error");
    assert_eq!(resp["code"], "backpressure");
    assert_eq!(resp["seq"], 3);
}
