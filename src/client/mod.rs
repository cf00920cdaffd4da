//! Wrapper around the protocol connection to make it friendlier to use.

mod controller;

pub use controller::*;

use std::fmt::Debug;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::protocol::data::{Color, ControllerData, ModeData};
use crate::protocol::{
    Connection, ConnectionState, DEFAULT_ADDR, MAX_BODY_SIZE, Message, NO_DEVICE_ID, Notification,
};
use crate::{OpenRgbError, OpenRgbResult};

/// Connection settings for [`OpenRgbClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Name shown in the server's client list, sent right after the
    /// handshake. `None` sends nothing.
    pub name: Option<String>,

    /// Deadline covering connect plus the version exchange.
    pub handshake_timeout: Duration,

    /// Deadline for one request/reply round trip.
    pub request_timeout: Duration,

    /// Cap on a frame's declared body size.
    pub max_body_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: None,
            handshake_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            max_body_size: MAX_BODY_SIZE,
        }
    }
}

struct ClientInner {
    conn: Mutex<Connection<TcpStream>>,
    config: ClientConfig,
    addr: SocketAddr,
}

/// Client for the OpenRGB SDK server.
///
/// One client owns one TCP connection. Calls are serialised on an internal
/// mutex because the protocol has no request IDs: replies are matched to
/// requests by arrival order, so exactly one request may be in flight.
/// Cloning the client shares the connection.
///
/// # Example
///
/// ```no_run
/// use openrgb_net::{OpenRgbClient, OpenRgbResult};
///
/// #[tokio::main]
/// async fn main() -> OpenRgbResult<()> {
///     // connect to default server at localhost
///     let client = OpenRgbClient::connect().await?;
///     for controller in client.get_all_controllers().await? {
///         println!("{}: {}", controller.id(), controller.name());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct OpenRgbClient {
    inner: Arc<ClientInner>,
}

impl OpenRgbClient {
    /// Connect to the default OpenRGB server at `127.0.0.1:6742`.
    ///
    /// Use [`OpenRgbClient::connect_to`] to connect to a specific server.
    pub async fn connect() -> OpenRgbResult<Self> {
        Self::connect_to(DEFAULT_ADDR).await
    }

    /// Connect to the OpenRGB server at given coordinates.
    ///
    /// # Arguments
    /// * `addr` - A socket address (eg: a `(host, port)` tuple)
    pub async fn connect_to(addr: impl ToSocketAddrs + Debug) -> OpenRgbResult<Self> {
        Self::connect_with(addr, ClientConfig::default()).await
    }

    /// Connect with explicit [`ClientConfig`] settings.
    pub async fn connect_with(
        addr: impl ToSocketAddrs + Debug,
        config: ClientConfig,
    ) -> OpenRgbResult<Self> {
        tracing::debug!("Connecting to OpenRGB server at {:?}...", addr);
        let deadline = Instant::now() + config.handshake_timeout;
        let stream = Self::dial(&addr, deadline).await?;
        let peer = stream
            .peer_addr()
            .map_err(|source| OpenRgbError::ConnectionError {
                addr: format!("{addr:?}"),
                source,
            })?;

        let mut conn = Connection::new(config.max_body_size);
        conn.open(stream, config.name.as_deref(), deadline).await?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                conn: Mutex::new(conn),
                config,
                addr: peer,
            }),
        })
    }

    async fn dial(addr: &(impl ToSocketAddrs + Debug), deadline: Instant) -> OpenRgbResult<TcpStream> {
        let res = tokio::time::timeout_at(deadline, TcpStream::connect(addr)).await;
        match res {
            Err(_elapsed) => Err(OpenRgbError::Timeout {
                operation: "Connect",
            }),
            Ok(Err(source)) => Err(OpenRgbError::ConnectionError {
                addr: format!("{addr:?}"),
                source,
            }),
            Ok(Ok(stream)) => Ok(stream),
        }
    }

    /// Closes the connection. Calls made afterwards fail with
    /// `NotConnected` until [`Self::reconnect`] succeeds.
    pub async fn close(&self) {
        self.inner.conn.lock().await.close().await;
    }

    /// Dials the same server again after [`Self::close`] or a fatal error.
    ///
    /// Fails with `AlreadyConnected` while the connection is still live.
    pub async fn reconnect(&self) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        if conn.state() != ConnectionState::Disconnected {
            return Err(OpenRgbError::AlreadyConnected);
        }
        let deadline = Instant::now() + self.inner.config.handshake_timeout;
        let stream = Self::dial(&self.inner.addr, deadline).await?;
        conn.open(stream, self.inner.config.name.as_deref(), deadline)
            .await
    }

    /// Whether the connection is currently usable.
    pub async fn is_connected(&self) -> bool {
        self.inner.conn.lock().await.state() == ConnectionState::Connected
    }

    /// Protocol version negotiated with the server.
    ///
    /// This is the lowest of this client's implemented version
    /// ([`crate::PROTOCOL_VERSION`]) and the server's.
    pub async fn protocol_version(&self) -> u32 {
        self.inner.conn.lock().await.protocol_version()
    }

    fn request_deadline(&self) -> Instant {
        Instant::now() + self.inner.config.request_timeout
    }
}

impl OpenRgbClient {
    /// Returns the number of controllers the server manages.
    pub async fn get_controller_count(&self) -> OpenRgbResult<u32> {
        let mut conn = self.inner.conn.lock().await;
        let reply = conn
            .request(
                NO_DEVICE_ID,
                &Message::RequestControllerCount,
                self.request_deadline(),
            )
            .await?;
        match reply {
            Message::ReplyControllerCount { count } => Ok(count),
            _ => Err(OpenRgbError::Malformed(
                "Controller count reply carried the wrong body".to_string(),
            )),
        }
    }

    /// Gets a controller by its index.
    pub async fn get_controller(&self, controller_id: u32) -> OpenRgbResult<Controller> {
        let data = self.get_controller_data(controller_id).await?;
        Ok(Controller::new(self.clone(), data))
    }

    /// Returns all available controllers.
    pub async fn get_all_controllers(&self) -> OpenRgbResult<Vec<Controller>> {
        let count = self.get_controller_count().await?;
        let mut controllers = Vec::with_capacity(count as usize);
        for id in 0..count {
            controllers.push(self.get_controller(id).await?);
        }
        Ok(controllers)
    }

    pub(crate) async fn get_controller_data(
        &self,
        controller_id: u32,
    ) -> OpenRgbResult<ControllerData> {
        let mut conn = self.inner.conn.lock().await;
        let request = Message::RequestControllerData {
            protocol_version: conn.protocol_version(),
        };
        let reply = conn
            .request(controller_id, &request, self.request_deadline())
            .await?;
        match reply {
            Message::ReplyControllerData { mut controller } => {
                controller.set_id(controller_id);
                Ok(controller)
            }
            _ => Err(OpenRgbError::Malformed(
                "Controller data reply carried the wrong body".to_string(),
            )),
        }
    }

    /// Sets the name for this client's connection.
    ///
    /// This is viewable in the OpenRGB SDK server tab.
    pub async fn set_name(&self, name: impl Into<String>) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        conn.send_message(
            NO_DEVICE_ID,
            &Message::SetClientName { name: name.into() },
        )
        .await
    }

    /// Resizes a resizable controller zone.
    pub async fn resize_zone(
        &self,
        controller_id: u32,
        zone_id: u32,
        new_size: u32,
    ) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        conn.send_message(controller_id, &Message::ResizeZone { zone_id, new_size })
            .await
    }

    /// Sets every LED of a controller, in LED-array order.
    pub async fn update_leds(&self, controller_id: u32, colors: &[Color]) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        conn.send_message(
            controller_id,
            &Message::UpdateLeds {
                colors: colors.to_vec(),
            },
        )
        .await
    }

    /// Sets every LED of one zone.
    pub async fn update_zone_leds(
        &self,
        controller_id: u32,
        zone_id: u32,
        colors: &[Color],
    ) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        conn.send_message(
            controller_id,
            &Message::UpdateZoneLeds {
                zone_id,
                colors: colors.to_vec(),
            },
        )
        .await
    }

    /// Sets a single LED.
    pub async fn update_led(
        &self,
        controller_id: u32,
        led_id: u32,
        color: Color,
    ) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        conn.send_message(controller_id, &Message::UpdateSingleLed { led_id, color })
            .await
    }

    /// Switches a controller to its custom mode.
    pub async fn set_custom_mode(&self, controller_id: u32) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        conn.send_message(controller_id, &Message::SetCustomMode).await
    }

    /// Pushes a mode description to a controller.
    ///
    /// The server's exact behavior regarding the active mode is left to it;
    /// this sends the raw operation.
    pub async fn update_mode(
        &self,
        controller_id: u32,
        mode_id: u32,
        mode: &ModeData,
    ) -> OpenRgbResult<()> {
        let mut conn = self.inner.conn.lock().await;
        conn.send_message(
            controller_id,
            &Message::UpdateMode {
                mode_id,
                mode: mode.clone(),
            },
        )
        .await
    }

    /// Waits up to `timeout` for a server notification.
    ///
    /// `Ok(None)` means the wire stayed idle; the connection is fine. Note
    /// that the connection is held for the whole wait, so keep the timeout
    /// short when mixing polling with requests from other clones.
    pub async fn poll_notification(
        &self,
        timeout: Duration,
    ) -> OpenRgbResult<Option<Notification>> {
        let mut conn = self.inner.conn.lock().await;
        conn.poll_notification(Instant::now() + timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "can only test with openrgb running"]
    async fn test_connect() -> OpenRgbResult<()> {
        let _client = OpenRgbClient::connect().await?;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "can only test with openrgb running"]
    async fn test_get_controller_count() -> OpenRgbResult<()> {
        let client = OpenRgbClient::connect().await?;
        let count = client.get_controller_count().await?;
        assert!(count > 0);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "can only test with openrgb running"]
    async fn test_update_leds() -> OpenRgbResult<()> {
        let client = OpenRgbClient::connect().await?;
        let controller = client.get_controller(0).await?;
        controller
            .set_leds(&vec![Color::new(255, 0, 50); controller.num_leds()])
            .await?;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "can only test with openrgb running"]
    async fn test_poll_notifications() -> OpenRgbResult<()> {
        let client = OpenRgbClient::connect().await?;
        let n = client.poll_notification(Duration::from_millis(100)).await?;
        assert!(n.is_none());
        Ok(())
    }
}
