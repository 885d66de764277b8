//! End-to-end relay tests over real TCP connections

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_relay::{Acceptor, Relay, RelayConfig, RelayHandle, SharedSecret};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

async fn start_relay() -> (SocketAddr, RelayHandle) {
    let config = RelayConfig::new("127.0.0.1:0".parse().unwrap());
    let listener = TcpListener::bind(config.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (relay, handle) = Relay::new(&config.server_name, config.inbound_capacity);
    tokio::spawn(relay.run());

    let auth = Arc::new(SharedSecret::new(config.passphrase.clone()));
    let acceptor = Acceptor::new(handle.clone(), auth, config);
    tokio::spawn(acceptor.serve(listener));

    (addr, handle)
}

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    /// Complete the handshake as `name`
    async fn join(addr: SocketAddr, name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        assert_eq!(client.next_line().await.as_deref(), Some("Say my name..."));
        client.send("heisenberg").await;
        assert_eq!(client.next_line().await.as_deref(), Some("And what's yours?"));
        client.send(name).await;
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn next_line(&mut self) -> Option<String> {
        timeout(WAIT, self.lines.next_line()).await.unwrap().unwrap()
    }
}

/// Registration is asynchronous; wait until the relay sees `n` members
async fn wait_for_members(handle: &RelayHandle, n: usize) {
    timeout(WAIT, async {
        while handle.member_count().await.unwrap() != n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_two_clients_both_receive_message() {
    let (addr, handle) = start_relay().await;

    let mut alice = TestClient::join(addr, "alice").await;
    let mut bob = TestClient::join(addr, "bob").await;
    wait_for_members(&handle, 2).await;

    alice.send("hello").await;

    assert_eq!(alice.next_line().await.as_deref(), Some("alice: hello"));
    assert_eq!(bob.next_line().await.as_deref(), Some("alice: hello"));
}

#[tokio::test]
async fn test_wrong_passphrase_gets_no_second_prompt() {
    let (addr, handle) = start_relay().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"wrongpass\n").await.unwrap();

    let mut received = Vec::new();
    timeout(WAIT, stream.read_to_end(&mut received))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(received, b"Say my name...\n");
    assert_eq!(handle.member_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_passphrase_is_case_sensitive() {
    let (addr, _handle) = start_relay().await;

    let mut client = TestClient::connect(addr).await;
    assert_eq!(client.next_line().await.as_deref(), Some("Say my name..."));
    client.send("Heisenberg").await;
    assert_eq!(client.next_line().await, None);
}

#[tokio::test]
async fn test_each_message_delivered_once_per_session() {
    let (addr, handle) = start_relay().await;

    let mut clients = Vec::new();
    for name in ["a", "b", "c"] {
        clients.push(TestClient::join(addr, name).await);
    }
    wait_for_members(&handle, 3).await;

    clients[1].send("one").await;
    clients[1].send("two").await;

    for client in &mut clients {
        assert_eq!(client.next_line().await.as_deref(), Some("b: one"));
        assert_eq!(client.next_line().await.as_deref(), Some("b: two"));
    }
}

#[tokio::test]
async fn test_observers_agree_on_order() {
    let (addr, handle) = start_relay().await;

    let mut a = TestClient::join(addr, "a").await;
    let mut b = TestClient::join(addr, "b").await;
    let mut watcher = TestClient::join(addr, "w").await;
    wait_for_members(&handle, 3).await;

    for i in 0..20 {
        a.send(&format!("{}", i)).await;
        b.send(&format!("{}", i)).await;
    }

    let mut seen = Vec::new();
    for client in [&mut a, &mut b, &mut watcher] {
        let mut lines = Vec::new();
        for _ in 0..40 {
            lines.push(client.next_line().await.unwrap());
        }
        seen.push(lines);
    }

    assert_eq!(seen[0], seen[1]);
    assert_eq!(seen[1], seen[2]);
    // Per-sender order survives the interleaving.
    let from_a: Vec<_> = seen[2].iter().filter(|l| l.starts_with("a: ")).cloned().collect();
    let expected: Vec<_> = (0..20).map(|i| format!("a: {}", i)).collect();
    assert_eq!(from_a, expected);
}

#[tokio::test]
async fn test_closed_session_is_deregistered() {
    let (addr, handle) = start_relay().await;

    let mut alice = TestClient::join(addr, "alice").await;
    let bob = TestClient::join(addr, "bob").await;
    wait_for_members(&handle, 2).await;

    drop(bob);
    wait_for_members(&handle, 1).await;

    alice.send("anyone?").await;
    assert_eq!(alice.next_line().await.as_deref(), Some("alice: anyone?"));
}

#[tokio::test]
async fn test_client_in_handshake_does_not_receive_broadcasts() {
    let (addr, handle) = start_relay().await;

    let mut alice = TestClient::join(addr, "alice").await;
    wait_for_members(&handle, 1).await;

    let mut pending = TestClient::connect(addr).await;
    assert_eq!(pending.next_line().await.as_deref(), Some("Say my name..."));

    alice.send("secret").await;
    assert_eq!(alice.next_line().await.as_deref(), Some("alice: secret"));

    pending.send("heisenberg").await;
    assert_eq!(pending.next_line().await.as_deref(), Some("And what's yours?"));
    pending.send("late").await;
    wait_for_members(&handle, 2).await;

    alice.send("welcome").await;
    assert_eq!(pending.next_line().await.as_deref(), Some("alice: welcome"));
}
