use std::sync::Arc;

use crate::core::{speed_code, ClientConfig, DeviceStatus, Direction, Result};
use crate::network::{Transport, UdpTransport};
use crate::protocol::legacy::{encode_frame, LegacyCommand, LegacyFrame};
use super::events::{EventSink, ExchangeEvent, TracingSink};

/// Client for controllers speaking the V1 protocol.
///
/// V1 has no absolute power command, only a toggle, so power, speed and
/// direction changes read the status first and only write when the device
/// differs.
pub struct LegacyFanClient<T = UdpTransport> {
    /// Controller host
    host: String,
    /// Controller port
    port: u16,
    /// Performs the exchanges
    transport: T,
    /// Receives exchange events
    events: Arc<dyn EventSink>,
}

impl LegacyFanClient<UdpTransport> {
    /// Creates a client with the default timeout and a [`TracingSink`]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        LegacyFanClient {
            host: host.into(),
            port,
            transport: UdpTransport::default(),
            events: Arc::new(TracingSink),
        }
    }

    /// Creates a client from a validated configuration; credentials are unused
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(LegacyFanClient {
            host: config.host.clone(),
            port: config.port,
            transport: UdpTransport::new(config.timeout),
            events: Arc::new(TracingSink),
        })
    }
}

impl<T: Transport> LegacyFanClient<T> {
    /// Replaces the transport
    pub fn with_transport<U: Transport>(self, transport: U) -> LegacyFanClient<U> {
        LegacyFanClient {
            host: self.host,
            port: self.port,
            transport,
            events: self.events,
        }
    }

    /// Replaces the event sink
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Reads the current status
    pub async fn status(&self) -> Result<DeviceStatus> {
        let status = self.read_frame().await?.status();
        self.events.record(&ExchangeEvent::StatusRead { status: &status });
        Ok(status)
    }

    /// Turns the fan on
    pub async fn power_on(&self) -> Result<DeviceStatus> {
        if !self.read_frame().await?.is_on() {
            self.send(LegacyCommand::TogglePower).await?;
        }
        self.status().await
    }

    /// Turns the fan off
    pub async fn power_off(&self) -> Result<DeviceStatus> {
        if self.read_frame().await?.is_on() {
            self.send(LegacyCommand::TogglePower).await?;
        }
        self.status().await
    }

    /// Sets the speed to one of [`FAN_SPEEDS`](crate::core::FAN_SPEEDS)
    pub async fn set_speed(&self, speed: &str) -> Result<DeviceStatus> {
        let code = speed_code(speed)?;
        if self.read_frame().await?.speed != code {
            self.send(LegacyCommand::Speed(code)).await?;
        }
        self.status().await
    }

    /// Sets the direction from a wire code ("00".."02") or a name
    pub async fn set_direction(&self, direction: &str) -> Result<DeviceStatus> {
        let direction: Direction = direction.parse()?;
        if self.read_frame().await?.direction != direction.code() {
            self.send(LegacyCommand::Direction(direction)).await?;
        }
        self.status().await
    }

    /// Turns the fan on in sleep mode
    pub async fn sleep(&self) -> Result<DeviceStatus> {
        self.power_on().await?;
        self.send(LegacyCommand::Sleep).await?;
        self.status().await
    }

    /// Turns the fan on in party mode
    pub async fn party(&self) -> Result<DeviceStatus> {
        self.power_on().await?;
        self.send(LegacyCommand::Party).await?;
        self.status().await
    }

    async fn read_frame(&self) -> Result<LegacyFrame> {
        let reply = self.send(LegacyCommand::Status).await?;
        LegacyFrame::parse(&reply)
    }

    async fn send(&self, command: LegacyCommand) -> Result<bytes::Bytes> {
        let frame = encode_frame(command);
        self.events.record(&ExchangeEvent::RequestSent {
            host: &self.host,
            port: self.port,
            packet: &frame,
        });

        match self.transport.exchange(&self.host, self.port, &frame).await {
            Ok(reply) => {
                self.events.record(&ExchangeEvent::ResponseReceived {
                    host: &self.host,
                    port: self.port,
                    packet: &reply,
                });
                Ok(reply)
            }
            Err(error) => {
                self.events.record(&ExchangeEvent::ExchangeFailed {
                    host: &self.host,
                    port: self.port,
                    error: &error,
                });
                Err(error)
            }
        }
    }
}
