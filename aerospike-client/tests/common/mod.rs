//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aerospike_client::{ClientConfig, Cluster, StaticResolver};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Default)]
struct ServerState {
    values: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<Vec<String>>>,
    accepted: AtomicUsize,
    closed: AtomicUsize,
    silent: bool,
}

/// In-process info server answering from a mutable name/value table.
///
/// Names without a value are left out of the response.
pub struct MockInfoServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    task: JoinHandle<()>,
}

impl MockInfoServer {
    pub async fn start<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let state = ServerState {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Default::default()
        };
        Self::spawn(state).await
    }

    /// A server that accepts connections and never answers.
    pub async fn silent() -> Self {
        Self::spawn(ServerState {
            silent: true,
            ..Default::default()
        })
        .await
    }

    /// A node answering `node` and `build`.
    pub async fn node(name: &str, build: &str) -> Self {
        Self::start([("node", name), ("build", build)]).await
    }

    async fn spawn(state: ServerState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("no local address");
        let state = Arc::new(state);

        let task_state = Arc::clone(&state);
        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                task_state.accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(socket, Arc::clone(&task_state)));
            }
        });

        Self { addr, state, task }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn set(&self, name: &str, value: &str) {
        self.state
            .values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove(&self, name: &str) {
        self.state.values.lock().unwrap().remove(name);
    }

    pub fn accepted(&self) -> usize {
        self.state.accepted.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Waits until `count` client connections have been closed.
    pub async fn wait_closed(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while self.closed() < count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {} closed connections, saw {}",
                count,
                self.closed()
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Drop for MockInfoServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut socket: TcpStream, state: Arc<ServerState>) {
    loop {
        let mut header = [0u8; 8];
        if socket.read_exact(&mut header).await.is_err() {
            break;
        }
        let len = (u64::from_be_bytes(header) & 0xFFFF_FFFF_FFFF) as usize;
        let mut body = vec![0u8; len];
        if socket.read_exact(&mut body).await.is_err() {
            break;
        }

        let names: Vec<String> = String::from_utf8_lossy(&body)
            .split('\n')
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        state.requests.lock().unwrap().push(names.clone());

        if state.silent {
            continue;
        }

        let reply: String = {
            let values = state.values.lock().unwrap();
            names
                .iter()
                .filter_map(|n| values.get(n).map(|v| format!("{}\t{}\n", n, v)))
                .collect()
        };
        if socket.write_all(&frame(reply.as_bytes())).await.is_err() {
            break;
        }
    }
    state.closed.fetch_add(1, Ordering::SeqCst);
}

pub fn frame(body: &[u8]) -> Vec<u8> {
    let header = (2u64 << 56) | (1u64 << 48) | body.len() as u64;
    let mut out = header.to_be_bytes().to_vec();
    out.extend_from_slice(body);
    out
}

/// An address nothing listens on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn test_config() -> ClientConfig {
    ClientConfig::builder()
        .connection_timeout(TEST_TIMEOUT)
        .build()
        .expect("failed to build config")
}

/// A cluster whose every seed host resolves to `addresses`.
pub fn cluster_for(addresses: Vec<SocketAddr>) -> Cluster {
    Cluster::with_resolver(test_config(), Arc::new(StaticResolver::new(addresses)))
}
