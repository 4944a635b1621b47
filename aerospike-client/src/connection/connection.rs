//! Short-lived info connection to a single server node.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use aerospike_core::{AerospikeError, Result};
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};

use super::info::{InfoCodec, InfoRequest, InfoResponse};

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A connection used for info queries.
///
/// Every network step is bounded by the timeout the connection was opened with.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    address: SocketAddr,
    stream: TcpStream,
    codec: InfoCodec,
    read_buffer: BytesMut,
    timeout: Duration,
}

impl Connection {
    /// Creates a connection from an established TCP stream.
    pub fn new(stream: TcpStream, address: SocketAddr, timeout: Duration) -> Self {
        Self {
            id: ConnectionId::new(),
            address,
            stream,
            codec: InfoCodec::new(),
            read_buffer: BytesMut::with_capacity(4096),
            timeout,
        }
    }

    /// Returns the remote address of this connection.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Opens a connection to `address`, failing if it takes longer than `timeout`.
    pub async fn connect(address: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
            .await
            .map_err(|_| {
                AerospikeError::Timeout(format!(
                    "connecting to {} timed out after {:?}",
                    address, timeout
                ))
            })?
            .map_err(|e| {
                AerospikeError::Connection(format!("failed to connect to {}: {}", address, e))
            })?;

        stream.set_nodelay(true).map_err(|e| {
            AerospikeError::Connection(format!("failed to set TCP_NODELAY: {}", e))
        })?;

        tracing::debug!(address = %address, "established connection");
        Ok(Self::new(stream, address, timeout))
    }

    /// Requests the values of `names` and waits for the response.
    pub async fn request_info(&mut self, names: &[&str]) -> Result<InfoResponse> {
        let address = self.address;
        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.exchange(InfoRequest::new(names.iter().copied())))
            .await
            .map_err(|_| {
                AerospikeError::Timeout(format!(
                    "info request to {} timed out after {:?}",
                    address, timeout
                ))
            })?
    }

    async fn exchange(&mut self, request: InfoRequest) -> Result<InfoResponse> {
        let mut buf = BytesMut::new();
        self.codec.encode(request, &mut buf)?;

        self.stream.write_all(&buf).await.map_err(|e| {
            AerospikeError::Connection(format!("failed to write to {}: {}", self.address, e))
        })?;

        loop {
            if let Some(response) = self.codec.decode(&mut self.read_buffer)? {
                return Ok(response);
            }

            let bytes_read = self.stream.read_buf(&mut self.read_buffer).await.map_err(|e| {
                AerospikeError::Connection(format!("failed to read from {}: {}", self.address, e))
            })?;

            if bytes_read == 0 {
                return Err(AerospikeError::Connection(format!(
                    "connection to {} closed unexpectedly",
                    self.address
                )));
            }
        }
    }

    /// Closes this connection.
    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!(id = %self.id, error = %e, "shutdown on close failed");
        }
        tracing::debug!(id = %self.id, address = %self.address, "connection closed");
        Ok(())
    }
}
