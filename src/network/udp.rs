use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use bytes::Bytes;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

use crate::core::{Error, Result, DEFAULT_TIMEOUT, MAX_PACKET_SIZE};
use super::Transport;

/// UDP transport that opens a fresh socket for every exchange.
///
/// The socket is connected to the controller, so datagrams from any other
/// peer are ignored. It is closed when the exchange returns, whether it
/// succeeded, failed or timed out.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    /// Receive timeout
    timeout: Duration,
}

impl Default for UdpTransport {
    fn default() -> Self {
        UdpTransport::new(DEFAULT_TIMEOUT)
    }
}

impl UdpTransport {
    /// Creates a new transport with the given receive timeout
    pub fn new(timeout: Duration) -> Self {
        UdpTransport { timeout }
    }

    /// Returns the receive timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
        lookup_host((host, port))
            .await
            .map_err(|e| Error::network(format!("Failed to resolve {}:{}: {}", host, port, e)))?
            .next()
            .ok_or_else(|| Error::network(format!("No address found for {}:{}", host, port)))
    }
}

impl Transport for UdpTransport {
    async fn exchange(&self, host: &str, port: u16, request: &[u8]) -> Result<Bytes> {
        let target = Self::resolve(host, port).await?;
        let bind_addr: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| Error::network(format!("Failed to bind socket: {}", e)))?;
        socket
            .connect(target)
            .await
            .map_err(|e| Error::network(format!("Failed to connect to {}: {}", target, e)))?;

        socket
            .send(request)
            .await
            .map_err(|e| Error::network(format!("Failed to send to {}: {}", target, e)))?;

        let mut buf = vec![0u8; MAX_PACKET_SIZE];
        let size = match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(received) => received
                .map_err(|e| Error::network(format!("Failed to receive from {}: {}", target, e)))?,
            Err(_) => return Err(Error::Timeout(self.timeout)),
        };
        buf.truncate(size);

        Ok(Bytes::from(buf))
    }
}
