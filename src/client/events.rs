//! Exchange observability
//!
//! Clients report what happens during an exchange to an injected
//! [`EventSink`] instead of a global logger.

use crate::core::{DeviceStatus, Error};
use crate::protocol::ResponseFields;
use crate::util::to_hex;

/// Something that happened during one request/response exchange
#[derive(Debug)]
pub enum ExchangeEvent<'a> {
    /// A packet is about to be sent
    RequestSent {
        host: &'a str,
        port: u16,
        packet: &'a [u8],
    },
    /// A datagram came back
    ResponseReceived {
        host: &'a str,
        port: u16,
        packet: &'a [u8],
    },
    /// The response was parsed into fields
    FieldsParsed { fields: &'a ResponseFields },
    /// A status record was produced
    StatusRead { status: &'a DeviceStatus },
    /// The exchange failed; the error is returned to the caller as well
    ExchangeFailed {
        host: &'a str,
        port: u16,
        error: &'a Error,
    },
}

/// Receives exchange events
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ExchangeEvent<'_>);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ExchangeEvent<'_>) {
        match event {
            ExchangeEvent::RequestSent { host, port, packet } => {
                tracing::debug!(
                    host = %host,
                    port = *port,
                    size = packet.len(),
                    packet = %to_hex(packet),
                    "sending packet"
                );
            }
            ExchangeEvent::ResponseReceived { host, port, packet } => {
                tracing::debug!(
                    host = %host,
                    port = *port,
                    size = packet.len(),
                    packet = %to_hex(packet),
                    "received packet"
                );
            }
            ExchangeEvent::FieldsParsed { fields } => {
                tracing::debug!(count = fields.len(), ?fields, "parsed response fields");
            }
            ExchangeEvent::StatusRead { status } => {
                tracing::debug!(?status, "read status");
            }
            ExchangeEvent::ExchangeFailed { host, port, error } => {
                tracing::warn!(host = %host, port = *port, %error, "exchange failed");
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &ExchangeEvent<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sinks_accept_every_event() {
        let fields = ResponseFields::new();
        let error = Error::network("unreachable");
        let events = [
            ExchangeEvent::RequestSent { host: "fan", port: 4000, packet: &[0xFD, 0xFD] },
            ExchangeEvent::ResponseReceived { host: "fan", port: 4000, packet: &[] },
            ExchangeEvent::FieldsParsed { fields: &fields },
            ExchangeEvent::ExchangeFailed { host: "fan", port: 4000, error: &error },
        ];
        for event in &events {
            TracingSink.record(event);
            NullSink.record(event);
        }
    }
}
