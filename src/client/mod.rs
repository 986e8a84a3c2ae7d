//! Fan controller clients
//!
//! [`FanClient`] speaks the authenticated V2 protocol, [`LegacyFanClient`]
//! the older V1 protocol, and [`Controller`] picks one from a
//! [`ClientConfig`].
//!
//! Every mutating call performs its write and then reads the status back
//! from the controller. Nothing is cached between calls, so the returned
//! status is always what the device reported.
//!
//! # Examples
//!
//! ```no_run
//! use twinfresh::FanClient;
//!
//! # async fn run() -> twinfresh::Result<()> {
//! let client = FanClient::new("192.168.1.40", 4000, "0123456789ABCDEF", "1111");
//! let status = client.set_speed("02").await?;
//! println!("running: {} at speed {}", status.is_on, status.speed);
//! # Ok(())
//! # }
//! ```

mod events;
mod legacy;

pub use self::events::{EventSink, ExchangeEvent, NullSink, TracingSink};
pub use self::legacy::LegacyFanClient;

use std::sync::Arc;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::core::{
    speed_code, ClientConfig, Credentials, DeviceStatus, Direction, ProtocolError,
    ProtocolVersion, Result,
};
use crate::network::{Transport, UdpTransport};
use crate::protocol::{mode, power, translate, Command, PacketCodec, Request, ResponseFields};

/// Commands read for a status record
const STATUS_COMMANDS: [Command; 6] = [
    Command::DEVICE_TYPE,
    Command::ON_OFF,
    Command::SPEED,
    Command::CURRENT_HUMIDITY,
    Command::DIRECTION,
    Command::MODE,
];

/// Client for controllers speaking the V2 protocol
pub struct FanClient<T = UdpTransport> {
    /// Controller host
    host: String,
    /// Controller port
    port: u16,
    /// Codec holding the credentials
    codec: PacketCodec,
    /// Performs the exchanges
    transport: T,
    /// Receives exchange events
    events: Arc<dyn EventSink>,
}

impl FanClient<UdpTransport> {
    /// Creates a client with the default timeout and a [`TracingSink`]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        device_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        FanClient {
            host: host.into(),
            port,
            codec: PacketCodec::new(Credentials::new(device_id, password)),
            transport: UdpTransport::default(),
            events: Arc::new(TracingSink),
        }
    }

    /// Creates a client from a validated configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(FanClient {
            host: config.host.clone(),
            port: config.port,
            codec: PacketCodec::new(config.credentials.clone()),
            transport: UdpTransport::new(config.timeout),
            events: Arc::new(TracingSink),
        })
    }
}

impl<T: Transport> FanClient<T> {
    /// Replaces the transport
    pub fn with_transport<U: Transport>(self, transport: U) -> FanClient<U> {
        FanClient {
            host: self.host,
            port: self.port,
            codec: self.codec,
            transport,
            events: self.events,
        }
    }

    /// Replaces the event sink
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the controller host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the controller port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Reads the current status
    pub async fn status(&self) -> Result<DeviceStatus> {
        let fields = self.exchange(Request::read(&STATUS_COMMANDS)).await?;
        let status = translate(&fields);
        self.events.record(&ExchangeEvent::StatusRead { status: &status });
        Ok(status)
    }

    /// Turns the fan on
    pub async fn power_on(&self) -> Result<DeviceStatus> {
        self.write(&[(Command::ON_OFF, power::ON)]).await
    }

    /// Turns the fan off
    pub async fn power_off(&self) -> Result<DeviceStatus> {
        self.write(&[(Command::ON_OFF, power::OFF)]).await
    }

    /// Sets the speed to one of [`FAN_SPEEDS`](crate::core::FAN_SPEEDS)
    pub async fn set_speed(&self, speed: &str) -> Result<DeviceStatus> {
        let code = speed_code(speed)?;
        self.write(&[(Command::SPEED, code)]).await
    }

    /// Sets the direction from a wire code ("00".."02") or a name
    pub async fn set_direction(&self, direction: &str) -> Result<DeviceStatus> {
        let direction: Direction = direction.parse()?;
        self.write(&[(Command::DIRECTION, direction.code())]).await
    }

    /// Turns the fan on in sleep mode
    pub async fn sleep(&self) -> Result<DeviceStatus> {
        self.write(&[(Command::ON_OFF, power::ON), (Command::MODE, mode::SLEEP)]).await
    }

    /// Turns the fan on in party mode
    pub async fn party(&self) -> Result<DeviceStatus> {
        self.write(&[(Command::ON_OFF, power::ON), (Command::MODE, mode::PARTY)]).await
    }

    /// Reads the current relative humidity in percent
    pub async fn humidity(&self) -> Result<Option<u8>> {
        let fields = self.exchange(Request::read(&[Command::CURRENT_HUMIDITY])).await?;
        Ok(fields.byte(Command::CURRENT_HUMIDITY))
    }

    /// Reads arbitrary commands and returns the raw fields
    pub async fn read_fields(&self, commands: &[Command]) -> Result<ResponseFields> {
        self.exchange(Request::read(commands)).await
    }

    /// Writes values, then reads the status back
    async fn write(&self, values: &[(Command, u8)]) -> Result<DeviceStatus> {
        self.exchange(Request::read_write(values)).await?;
        self.status().await
    }

    async fn exchange(&self, request: Request) -> Result<ResponseFields> {
        let result = self.try_exchange(request).await;
        if let Err(error) = &result {
            self.events.record(&ExchangeEvent::ExchangeFailed {
                host: &self.host,
                port: self.port,
                error,
            });
        }
        result
    }

    async fn try_exchange(&self, request: Request) -> Result<ResponseFields> {
        let mut codec = self.codec.clone();

        let mut packet = BytesMut::new();
        codec.encode(request, &mut packet)?;
        self.events.record(&ExchangeEvent::RequestSent {
            host: &self.host,
            port: self.port,
            packet: &packet,
        });

        let reply = self.transport.exchange(&self.host, self.port, &packet).await?;
        self.events.record(&ExchangeEvent::ResponseReceived {
            host: &self.host,
            port: self.port,
            packet: &reply,
        });

        let fields = codec
            .decode(&mut BytesMut::from(&reply[..]))?
            .ok_or(ProtocolError::Truncated)?;
        self.events.record(&ExchangeEvent::FieldsParsed { fields: &fields });
        Ok(fields)
    }
}

/// A client for either protocol version
pub enum Controller {
    V1(LegacyFanClient),
    V2(FanClient),
}

impl Controller {
    /// Builds the client selected by `config.version`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(match config.version {
            ProtocolVersion::V1 => Controller::V1(LegacyFanClient::from_config(config)?),
            ProtocolVersion::V2 => Controller::V2(FanClient::from_config(config)?),
        })
    }

    /// Replaces the event sink of the wrapped client
    pub fn with_event_sink(self, events: Arc<dyn EventSink>) -> Self {
        match self {
            Controller::V1(client) => Controller::V1(client.with_event_sink(events)),
            Controller::V2(client) => Controller::V2(client.with_event_sink(events)),
        }
    }

    /// Returns the protocol spoken by the wrapped client
    pub fn version(&self) -> ProtocolVersion {
        match self {
            Controller::V1(_) => ProtocolVersion::V1,
            Controller::V2(_) => ProtocolVersion::V2,
        }
    }

    pub async fn status(&self) -> Result<DeviceStatus> {
        match self {
            Controller::V1(client) => client.status().await,
            Controller::V2(client) => client.status().await,
        }
    }

    pub async fn power_on(&self) -> Result<DeviceStatus> {
        match self {
            Controller::V1(client) => client.power_on().await,
            Controller::V2(client) => client.power_on().await,
        }
    }

    pub async fn power_off(&self) -> Result<DeviceStatus> {
        match self {
            Controller::V1(client) => client.power_off().await,
            Controller::V2(client) => client.power_off().await,
        }
    }

    pub async fn set_speed(&self, speed: &str) -> Result<DeviceStatus> {
        match self {
            Controller::V1(client) => client.set_speed(speed).await,
            Controller::V2(client) => client.set_speed(speed).await,
        }
    }

    pub async fn set_direction(&self, direction: &str) -> Result<DeviceStatus> {
        match self {
            Controller::V1(client) => client.set_direction(direction).await,
            Controller::V2(client) => client.set_direction(direction).await,
        }
    }

    pub async fn sleep(&self) -> Result<DeviceStatus> {
        match self {
            Controller::V1(client) => client.sleep().await,
            Controller::V2(client) => client.sleep().await,
        }
    }

    pub async fn party(&self) -> Result<DeviceStatus> {
        match self {
            Controller::V1(client) => client.party().await,
            Controller::V2(client) => client.party().await,
        }
    }

    /// Reads the humidity; V1 controllers do not report it
    pub async fn humidity(&self) -> Result<Option<u8>> {
        match self {
            Controller::V1(_) => Ok(None),
            Controller::V2(client) => client.humidity().await,
        }
    }
}
