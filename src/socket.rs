//! Framed request/reply transport: length-delimited JSON frames over TCP or
//! a Unix domain socket (spec §4.1, §6).

// Layer 1: Standard library imports
use std::path::{Path, PathBuf};
use std::time::Duration;

// Layer 2: Third-party crate imports
use bytes::{Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

// Layer 3: Internal module imports
use crate::error::SocketError;

/// Default per-request timeout for ops traffic (spec §5).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The deterministic local ops endpoint path for a given instance id,
/// substituting a Unix domain socket for the original's `ipc://` transport
/// (spec §6, §4.1).
pub fn local_ops_socket_path(instance_id: u32) -> PathBuf {
    PathBuf::from(format!("/tmp/actor_host_instance_{instance_id}.sock"))
}

enum Transport {
    Tcp(Framed<TcpStream, LengthDelimitedCodec>),
    Unix(Framed<UnixStream, LengthDelimitedCodec>),
}

/// One connected, framed JSON channel — either end of a request/reply pair.
pub struct MessageSocket {
    transport: Transport,
}

impl MessageSocket {
    fn from_tcp(stream: TcpStream) -> Self {
        Self {
            transport: Transport::Tcp(Framed::new(stream, LengthDelimitedCodec::new())),
        }
    }

    fn from_unix(stream: UnixStream) -> Self {
        Self {
            transport: Transport::Unix(Framed::new(stream, LengthDelimitedCodec::new())),
        }
    }

    /// Connect to a TCP endpoint in client mode (used for the host-ops
    /// socket to the HostManager).
    pub async fn connect_tcp(addr: &str) -> Result<Self, SocketError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::from_tcp(stream))
    }

    /// Connect to a Unix domain socket in client mode.
    pub async fn connect_unix(path: &Path) -> Result<Self, SocketError> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self::from_unix(stream))
    }

    /// Receive one decoded message. Blocks until a frame arrives or the
    /// transport errors.
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<T, SocketError> {
        let frame = match &mut self.transport {
            Transport::Tcp(framed) => framed.next().await,
            Transport::Unix(framed) => framed.next().await,
        };
        let bytes = frame.ok_or(SocketError::Closed)??;
        decode(&bytes)
    }

    /// Send one message as a reply (or, in client mode, as a request).
    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), SocketError> {
        let bytes = encode(message)?;
        match &mut self.transport {
            Transport::Tcp(framed) => framed.send(bytes).await?,
            Transport::Unix(framed) => framed.send(bytes).await?,
        }
        Ok(())
    }

    /// One round trip on a client socket: send `message`, wait up to
    /// `timeout` for the reply. Times out with `SocketError::Timeout`,
    /// leaving the connection to be dropped by the caller (spec §4.1: "the
    /// connection may be reset on timeout").
    pub async fn request<Req: Serialize, Resp: DeserializeOwned>(
        &mut self,
        message: &Req,
        timeout: Duration,
    ) -> Result<Resp, SocketError> {
        self.send(message).await?;
        tokio::time::timeout(timeout, self.recv())
            .await
            .map_err(|_| SocketError::Timeout)?
    }
}

fn encode<T: Serialize>(message: &T) -> Result<Bytes, SocketError> {
    let json = serde_json::to_vec(message).map_err(|err| SocketError::Malformed(err.to_string()))?;
    Ok(Bytes::from(json))
}

fn decode<T: DeserializeOwned>(bytes: &BytesMut) -> Result<T, SocketError> {
    serde_json::from_slice(bytes).map_err(|err| SocketError::Malformed(err.to_string()))
}

/// Server-side bind handle for the local ops endpoint (a Unix domain
/// socket).
pub struct UnixOpsListener {
    listener: UnixListener,
}

impl UnixOpsListener {
    /// Bind the deterministic path for `instance_id`, removing any stale
    /// socket file left behind by a previous run.
    pub fn bind(instance_id: u32) -> Result<Self, SocketError> {
        let path = local_ops_socket_path(instance_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        let listener = UnixListener::bind(&path)?;
        Ok(Self { listener })
    }

    /// Accept the next incoming connection and wrap it as a `MessageSocket`.
    pub async fn accept(&self) -> Result<MessageSocket, SocketError> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(MessageSocket::from_unix(stream))
    }
}

/// Server-side bind handle for a TCP endpoint (unused by this host itself —
/// the host only dials the HostManager — but kept for symmetry and tests
/// that stand in for the HostManager).
pub struct TcpOpsListener {
    listener: TcpListener,
}

impl TcpOpsListener {
    pub async fn bind(addr: &str) -> Result<Self, SocketError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub async fn accept(&self) -> Result<MessageSocket, SocketError> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(MessageSocket::from_tcp(stream))
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr, SocketError> {
        Ok(self.listener.local_addr()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_ops_socket_path_is_deterministic() {
        let path = local_ops_socket_path(7);
        assert_eq!(path, PathBuf::from("/tmp/actor_host_instance_7.sock"));
    }

    #[tokio::test]
    async fn tcp_round_trip_request_reply() {
        let listener = TcpOpsListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let mut socket = listener.accept().await.expect("accept");
            let request: serde_json::Value = socket.recv().await.expect("recv");
            assert_eq!(request["req"], "keepalive");
            socket.send(&json!({"status": "ok"})).await.expect("send");
        });

        let mut client = MessageSocket::connect_tcp(&addr.to_string()).await.expect("connect");
        let reply: serde_json::Value = client
            .request(&json!({"req": "keepalive"}), Duration::from_secs(1))
            .await
            .expect("request");
        assert_eq!(reply["status"], "ok");

        server.await.expect("server task");
    }

    #[tokio::test]
    async fn unix_socket_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ops.sock");
        let listener = UnixListener::bind(&path).expect("bind");
        let wrapped = UnixOpsListener { listener };

        let path_clone = path.clone();
        let server = tokio::spawn(async move {
            let mut socket = wrapped.accept().await.expect("accept");
            let request: serde_json::Value = socket.recv().await.expect("recv");
            assert_eq!(request["req"], "keepalive");
            socket.send(&json!({"status": "ok"})).await.expect("send");
        });

        let mut client = MessageSocket::connect_unix(&path_clone).await.expect("connect");
        let reply: serde_json::Value = client
            .request(&json!({"req": "keepalive"}), Duration::from_secs(1))
            .await
            .expect("request");
        assert_eq!(reply["status"], "ok");

        server.await.expect("server task");
    }

    #[tokio::test]
    async fn request_times_out_when_no_reply_sent() {
        let listener = TcpOpsListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let mut socket = listener.accept().await.expect("accept");
            let _request: serde_json::Value = socket.recv().await.expect("recv");
            // deliberately never replies
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let mut client = MessageSocket::connect_tcp(&addr.to_string()).await.expect("connect");
        let result: Result<serde_json::Value, SocketError> = client
            .request(&json!({"req": "keepalive"}), Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(SocketError::Timeout)));

        server.abort();
    }
}
