//! Network transport module
//!
//! A transport performs one request/response exchange with the controller.
//! The client is generic over [`Transport`] so exchanges can be replaced in
//! tests.

mod udp;

pub use self::udp::UdpTransport;

use std::future::Future;

use bytes::Bytes;

use crate::core::Result;

/// One datagram out, one datagram back
pub trait Transport: Send + Sync {
    /// Sends `request` to `host:port` and waits for the reply
    fn exchange(
        &self,
        host: &str,
        port: u16,
        request: &[u8],
    ) -> impl Future<Output = Result<Bytes>> + Send;
}
