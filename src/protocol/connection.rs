use std::collections::VecDeque;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;

use crate::protocol::{
    Message, NO_DEVICE_ID, PROTOCOL_VERSION, PacketHeader, ProtocolStream, ReceivedMessage,
};
use crate::{OpenRgbError, OpenRgbResult};

/// Server-initiated event, delivered outside the request/reply flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The device list changed; cached controller data is stale.
    DeviceListUpdated,
}

/// Connection lifecycle. `Closing` and `Connecting` are transient;
/// `Disconnected` is both the initial state and the terminal state after a
/// fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionState {
    Disconnected,
    Connecting,
    Handshaking,
    Connected,
    Closing,
}

/// Handle to one in-flight request, returned by [`Connection::send_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RequestTicket(u64);

/// One queued reply expectation.
///
/// The protocol has no request IDs: an inbound frame is matched to the first
/// expectation with the same packet code. Cancelled entries keep their queue
/// slot until their reply arrives so later same-code requests stay aligned.
struct Pending {
    ticket: u64,
    packet_id: crate::protocol::PacketId,
    reply: Option<Message>,
    cancelled: bool,
}

/// Client side of one OpenRGB connection: owns the framed transport, the
/// negotiated protocol version, the reply-expectation queue, and undelivered
/// notifications.
///
/// Exactly one reader and one writer identity touch the transport; this type
/// takes `&mut self` everywhere and installs no locks. Callers that share a
/// connection across threads serialise access externally
/// ([`crate::OpenRgbClient`] wraps it in a mutex).
pub(crate) struct Connection<S> {
    stream: Option<ProtocolStream<S>>,
    state: ConnectionState,
    protocol_version: u32,
    max_body_size: usize,
    pending: VecDeque<Pending>,
    notifications: VecDeque<Notification>,
    next_ticket: u64,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(max_body_size: usize) -> Self {
        Self {
            stream: None,
            state: ConnectionState::Disconnected,
            protocol_version: PROTOCOL_VERSION,
            max_body_size,
            pending: VecDeque::new(),
            notifications: VecDeque::new(),
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Protocol version negotiated with the server, `min(client, server)`.
    /// Constant for the connection's lifetime.
    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Takes an open byte stream through the version handshake.
    ///
    /// Sends `RequestProtocolVersion`, negotiates `min(client, server)`, then
    /// optionally names the client. A server that closes the stream before
    /// replying is a legacy daemon: the version is explicitly taken to be 0
    /// and the connection proceeds. A deadline firing is still fatal.
    pub async fn open(
        &mut self,
        stream: S,
        client_name: Option<&str>,
        deadline: Instant,
    ) -> OpenRgbResult<()> {
        if self.state != ConnectionState::Disconnected {
            return Err(OpenRgbError::AlreadyConnected);
        }
        self.pending.clear();
        self.notifications.clear();
        self.state = ConnectionState::Connecting;
        let mut stream = ProtocolStream::with_body_cap(stream, PROTOCOL_VERSION, self.max_body_size);

        self.state = ConnectionState::Handshaking;
        let negotiated = match self.handshake(&mut stream, deadline).await {
            Ok(v) => v,
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                return Err(e);
            }
        };

        if let Some(version) = negotiated {
            stream.set_protocol_version(version);
            self.protocol_version = version;
            if let Some(name) = client_name {
                let msg = Message::SetClientName {
                    name: name.to_owned(),
                };
                if let Err(e) = stream.send_message(NO_DEVICE_ID, &msg).await {
                    self.state = ConnectionState::Disconnected;
                    return Err(e);
                }
            }
        } else {
            // legacy daemon closed instead of answering
            tracing::debug!("Server closed during version exchange, assuming protocol version 0");
            stream.set_protocol_version(0);
            self.protocol_version = 0;
        }

        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        tracing::debug!(
            "Connected to OpenRGB server using protocol version {}",
            self.protocol_version
        );
        Ok(())
    }

    /// Runs the version exchange. `Ok(None)` is the legacy-close fallback.
    async fn handshake(
        &mut self,
        stream: &mut ProtocolStream<S>,
        deadline: Instant,
    ) -> OpenRgbResult<Option<u32>> {
        let request = Message::RequestProtocolVersion {
            client_version: PROTOCOL_VERSION,
        };
        stream.send_message(NO_DEVICE_ID, &request).await?;

        loop {
            let res = stream.recv_frame(deadline).await;
            let (header, body) = match res {
                Ok(frame) => frame,
                Err(OpenRgbError::Disconnected { .. }) => return Ok(None),
                Err(e) => return Err(e),
            };
            if header.packet_id.is_notification() {
                let mut msg = ReceivedMessage::new(&body, PROTOCOL_VERSION);
                Message::decode_inbound(header.packet_id, &mut msg)?;
                self.notifications.push_back(Notification::DeviceListUpdated);
                continue;
            }
            let mut msg = ReceivedMessage::new(&body, PROTOCOL_VERSION);
            return match Message::decode_inbound(header.packet_id, &mut msg)? {
                Message::ReplyProtocolVersion { server_version } => {
                    Ok(Some(PROTOCOL_VERSION.min(server_version)))
                }
                _ => Err(OpenRgbError::UnexpectedMessage(header.packet_id.code())),
            };
        }
    }

    /// Orderly shutdown. Queued expectations and notifications are dropped.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            self.state = ConnectionState::Closing;
            stream.shutdown().await;
        }
        self.pending.clear();
        self.notifications.clear();
        self.state = ConnectionState::Disconnected;
    }

    fn ensure_connected(&self) -> OpenRgbResult<()> {
        if self.state != ConnectionState::Connected {
            return Err(OpenRgbError::NotConnected);
        }
        Ok(())
    }

    /// Records a fatal error: the transport is dropped and every queued
    /// expectation behind the failure is failed with `Disconnected` (their
    /// waiters find the queue empty).
    fn fail(&mut self, err: OpenRgbError) -> OpenRgbError {
        tracing::debug!("Connection failed: {}", err);
        self.stream = None;
        self.pending.clear();
        self.state = ConnectionState::Disconnected;
        err
    }

    fn stream_mut(&mut self) -> OpenRgbResult<&mut ProtocolStream<S>> {
        self.stream.as_mut().ok_or(OpenRgbError::NotConnected)
    }

    /// Sends a message that gets no reply.
    pub async fn send_message(&mut self, device_id: u32, msg: &Message) -> OpenRgbResult<()> {
        self.ensure_connected()?;
        debug_assert!(!msg.packet_id().expects_reply());
        let res = self.stream_mut()?.send_message(device_id, msg).await;
        res.map_err(|e| self.fail(e))
    }

    /// Sends a request and queues a reply expectation for it.
    pub async fn send_request(
        &mut self,
        device_id: u32,
        msg: &Message,
    ) -> OpenRgbResult<RequestTicket> {
        self.ensure_connected()?;
        debug_assert!(msg.packet_id().expects_reply());
        let res = self.stream_mut()?.send_message(device_id, msg).await;
        res.map_err(|e| self.fail(e))?;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.push_back(Pending {
            ticket,
            packet_id: msg.packet_id(),
            reply: None,
            cancelled: false,
        });
        Ok(RequestTicket(ticket))
    }

    /// Waits for the reply matched to `ticket`, consuming inbound frames and
    /// routing them (replies to their expectations, notifications to the
    /// queue) until it lands.
    pub async fn await_reply(
        &mut self,
        ticket: RequestTicket,
        deadline: Instant,
    ) -> OpenRgbResult<Message> {
        loop {
            match self.pending.iter().position(|p| p.ticket == ticket.0) {
                // expectation vanished underneath us: the connection failed
                None => return Err(OpenRgbError::Disconnected { source: None }),
                Some(pos) => {
                    if let Some(reply) = self.pending[pos].reply.take() {
                        self.pending.remove(pos);
                        return Ok(reply);
                    }
                }
            }
            self.ensure_connected()?;
            let res = self.stream_mut()?.recv_frame(deadline).await;
            let (header, body) = match res {
                Ok(frame) => frame,
                Err(e) => return Err(self.fail(e)),
            };
            self.dispatch(header, body)?;
        }
    }

    /// Sends a request and waits for its reply.
    pub async fn request(
        &mut self,
        device_id: u32,
        msg: &Message,
        deadline: Instant,
    ) -> OpenRgbResult<Message> {
        let ticket = self.send_request(device_id, msg).await?;
        self.await_reply(ticket, deadline).await
    }

    /// Abandons a pending request. If its reply still arrives it is
    /// discarded silently; until then the entry keeps its slot so later
    /// same-code requests stay matched correctly.
    pub fn cancel(&mut self, ticket: RequestTicket) {
        if let Some(pos) = self.pending.iter().position(|p| p.ticket == ticket.0) {
            if self.pending[pos].reply.is_some() {
                self.pending.remove(pos);
            } else {
                self.pending[pos].cancelled = true;
            }
        }
    }

    /// Returns the next notification, waiting until `deadline` for one to
    /// arrive. `Ok(None)` means the deadline passed with the wire idle; the
    /// connection stays healthy.
    pub async fn poll_notification(
        &mut self,
        deadline: Instant,
    ) -> OpenRgbResult<Option<Notification>> {
        loop {
            if let Some(n) = self.notifications.pop_front() {
                return Ok(Some(n));
            }
            self.ensure_connected()?;
            let res = self.stream_mut()?.recv_frame_opt(deadline).await;
            match res {
                Ok(None) => return Ok(None),
                Ok(Some((header, body))) => self.dispatch(header, body)?,
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    /// Routes one inbound frame: notifications to their queue, replies to
    /// the first expectation with the same packet code. Anything else is
    /// `UnexpectedMessage` and fatal.
    fn dispatch(&mut self, header: PacketHeader, body: Vec<u8>) -> OpenRgbResult<()> {
        let id = header.packet_id;
        if id.is_notification() {
            let mut msg = ReceivedMessage::new(&body, self.protocol_version);
            if let Err(e) = Message::decode_inbound(id, &mut msg) {
                return Err(self.fail(e));
            }
            self.notifications.push_back(Notification::DeviceListUpdated);
            return Ok(());
        }

        let Some(pos) = self
            .pending
            .iter()
            .position(|p| p.packet_id == id && p.reply.is_none())
        else {
            return Err(self.fail(OpenRgbError::UnexpectedMessage(id.code())));
        };

        let mut msg = ReceivedMessage::new(&body, self.protocol_version);
        let reply = match Message::decode_inbound(id, &mut msg) {
            Ok(reply) => reply,
            Err(e) => return Err(self.fail(e)),
        };

        if self.pending[pos].cancelled {
            self.pending.remove(pos);
        } else {
            self.pending[pos].reply = Some(reply);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_test::io::{Builder, Mock};
    use tracing_test::traced_test;

    use super::*;
    use crate::protocol::stream::MAX_BODY_SIZE;

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    /// Scripts the version exchange the way every connection starts.
    trait HandshakeBuilder {
        fn negotiate_protocol(&mut self, server_version: u32) -> &mut Self;
    }

    impl HandshakeBuilder for Builder {
        fn negotiate_protocol(&mut self, server_version: u32) -> &mut Self {
            self
                // request protocol version request
                .write(b"ORGB")
                .write(&0_u32.to_le_bytes()) // device id
                .write(&40_u32.to_le_bytes()) // packet id
                .write(&4_u32.to_le_bytes()) // body size
                .write(&PROTOCOL_VERSION.to_le_bytes())
                // request protocol version response
                .read(b"ORGB")
                .read(&0_u32.to_le_bytes())
                .read(&40_u32.to_le_bytes())
                .read(&4_u32.to_le_bytes())
                .read(&server_version.to_le_bytes())
        }
    }

    async fn connect(mock: Mock) -> OpenRgbResult<Connection<Mock>> {
        let mut conn = Connection::new(MAX_BODY_SIZE);
        conn.open(mock, None, deadline()).await?;
        Ok(conn)
    }

    fn count_request(builder: &mut Builder) -> &mut Builder {
        builder
            .write(b"ORGB")
            .write(&[0; 8])
            .write(&0_u32.to_le_bytes())
    }

    fn count_reply(builder: &mut Builder, count: u32) -> &mut Builder {
        builder
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&0_u32.to_le_bytes())
            .read(&4_u32.to_le_bytes())
            .read(&count.to_le_bytes())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_handshake_negotiates_min() -> OpenRgbResult<()> {
        let mock = Builder::new().negotiate_protocol(5).build();
        let conn = connect(mock).await?;
        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(conn.protocol_version(), PROTOCOL_VERSION.min(5));

        let mock = Builder::new().negotiate_protocol(0).build();
        let conn = connect(mock).await?;
        assert_eq!(conn.protocol_version(), 0);
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_legacy_close_negotiates_version_zero() -> OpenRgbResult<()> {
        // the server closes instead of answering the version request
        let mock = Builder::new()
            .write(b"ORGB")
            .write(&0_u32.to_le_bytes())
            .write(&40_u32.to_le_bytes())
            .write(&4_u32.to_le_bytes())
            .write(&PROTOCOL_VERSION.to_le_bytes())
            .read(b"")
            .build();
        let conn = connect(mock).await?;
        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(conn.protocol_version(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_client_name_sent_after_handshake() -> OpenRgbResult<()> {
        let mock = Builder::new()
            .negotiate_protocol(1)
            .write(b"ORGB")
            .write(&0_u32.to_le_bytes())
            .write(&50_u32.to_le_bytes())
            .write(&6_u32.to_le_bytes())
            .write(&[0x04, 0x00, 0x66, 0x6F, 0x6F, 0x00])
            .build();
        let mut conn = Connection::new(MAX_BODY_SIZE);
        conn.open(mock, Some("foo"), deadline()).await?;
        assert_eq!(conn.state(), ConnectionState::Connected);
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_controller_count_request() -> OpenRgbResult<()> {
        let mut builder = Builder::new();
        builder.negotiate_protocol(1);
        count_request(&mut builder);
        count_reply(&mut builder, 7);
        let mut conn = connect(builder.build()).await?;

        let reply = conn
            .request(0, &Message::RequestControllerCount, deadline())
            .await?;
        assert_eq!(reply, Message::ReplyControllerCount { count: 7 });
        Ok(())
    }

    #[tokio::test]
    async fn test_fifo_different_codes_reversed_replies() -> OpenRgbResult<()> {
        let mut builder = Builder::new();
        builder.negotiate_protocol(1);
        count_request(&mut builder);
        builder
            // second request: protocol version
            .write(b"ORGB")
            .write(&0_u32.to_le_bytes())
            .write(&40_u32.to_le_bytes())
            .write(&4_u32.to_le_bytes())
            .write(&PROTOCOL_VERSION.to_le_bytes())
            // replies arrive in reverse order
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&40_u32.to_le_bytes())
            .read(&4_u32.to_le_bytes())
            .read(&9_u32.to_le_bytes());
        count_reply(&mut builder, 3);
        let mut conn = connect(builder.build()).await?;

        let count_ticket = conn
            .send_request(0, &Message::RequestControllerCount)
            .await?;
        let version_ticket = conn
            .send_request(
                0,
                &Message::RequestProtocolVersion {
                    client_version: PROTOCOL_VERSION,
                },
            )
            .await?;

        // the version reply arrives first but must land on the version
        // expectation, not the count one
        let count = conn.await_reply(count_ticket, deadline()).await?;
        assert_eq!(count, Message::ReplyControllerCount { count: 3 });
        let version = conn.await_reply(version_ticket, deadline()).await?;
        assert_eq!(version, Message::ReplyProtocolVersion { server_version: 9 });
        Ok(())
    }

    #[tokio::test]
    async fn test_fifo_same_code_matches_issue_order() -> OpenRgbResult<()> {
        let mut builder = Builder::new();
        builder.negotiate_protocol(1);
        count_request(&mut builder);
        count_request(&mut builder);
        count_reply(&mut builder, 1);
        count_reply(&mut builder, 2);
        let mut conn = connect(builder.build()).await?;

        let first = conn
            .send_request(0, &Message::RequestControllerCount)
            .await?;
        let second = conn
            .send_request(0, &Message::RequestControllerCount)
            .await?;

        // waiting on the second first still assigns replies by issue order
        let second_reply = conn.await_reply(second, deadline()).await?;
        let first_reply = conn.await_reply(first, deadline()).await?;
        assert_eq!(first_reply, Message::ReplyControllerCount { count: 1 });
        assert_eq!(second_reply, Message::ReplyControllerCount { count: 2 });
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_reply_discarded_silently() -> OpenRgbResult<()> {
        let mut builder = Builder::new();
        builder.negotiate_protocol(1);
        count_request(&mut builder);
        count_request(&mut builder);
        count_reply(&mut builder, 1);
        count_reply(&mut builder, 2);
        let mut conn = connect(builder.build()).await?;

        let first = conn
            .send_request(0, &Message::RequestControllerCount)
            .await?;
        let second = conn
            .send_request(0, &Message::RequestControllerCount)
            .await?;
        conn.cancel(first);

        // the cancelled expectation swallows the first reply
        let reply = conn.await_reply(second, deadline()).await?;
        assert_eq!(reply, Message::ReplyControllerCount { count: 2 });
        assert_eq!(conn.state(), ConnectionState::Connected);
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unexpected_message_is_fatal() -> OpenRgbResult<()> {
        let mut builder = Builder::new();
        builder.negotiate_protocol(1);
        count_request(&mut builder);
        builder
            // reply code 1 (controller data) while a count is pending
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&1_u32.to_le_bytes())
            .read(&4_u32.to_le_bytes())
            .read(&4_u32.to_le_bytes());
        let mut conn = connect(builder.build()).await?;

        let err = conn
            .request(0, &Message::RequestControllerCount, deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, OpenRgbError::UnexpectedMessage(1)));
        assert_eq!(conn.state(), ConnectionState::Disconnected);

        // every later call is NotConnected until reconnect
        let err = conn
            .request(0, &Message::RequestControllerCount, deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, OpenRgbError::NotConnected));
        Ok(())
    }

    #[tokio::test]
    async fn test_notification_queued_during_request() -> OpenRgbResult<()> {
        let mut builder = Builder::new();
        builder.negotiate_protocol(1);
        count_request(&mut builder);
        builder
            // spontaneous DeviceListUpdated lands before the reply
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&100_u32.to_le_bytes())
            .read(&0_u32.to_le_bytes());
        count_reply(&mut builder, 2);
        let mut conn = connect(builder.build()).await?;

        let reply = conn
            .request(0, &Message::RequestControllerCount, deadline())
            .await?;
        assert_eq!(reply, Message::ReplyControllerCount { count: 2 });

        // the notification was not consumed by the request
        let n = conn.poll_notification(deadline()).await?;
        assert_eq!(n, Some(Notification::DeviceListUpdated));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_notification_idle_returns_none() -> OpenRgbResult<()> {
        // a live but silent server; a mock script would signal EOF here
        let (client, mut server) = tokio::io::duplex(256);
        let mut conn = Connection::new(MAX_BODY_SIZE);
        let server_task = async {
            let mut buf = [0u8; 20];
            server.read_exact(&mut buf).await.unwrap(); // version request
            server.write_all(b"ORGB").await.unwrap();
            server.write_all(&0_u32.to_le_bytes()).await.unwrap();
            server.write_all(&40_u32.to_le_bytes()).await.unwrap();
            server.write_all(&4_u32.to_le_bytes()).await.unwrap();
            server.write_all(&1_u32.to_le_bytes()).await.unwrap();
        };
        let (opened, ()) = tokio::join!(conn.open(client, None, deadline()), server_task);
        opened?;

        let n = conn
            .poll_notification(Instant::now() + Duration::from_millis(100))
            .await?;
        assert_eq!(n, None);
        assert_eq!(conn.state(), ConnectionState::Connected);

        // a notification showing up later is delivered by the next poll
        server.write_all(b"ORGB").await.unwrap();
        server.write_all(&0_u32.to_le_bytes()).await.unwrap();
        server.write_all(&100_u32.to_le_bytes()).await.unwrap();
        server.write_all(&0_u32.to_le_bytes()).await.unwrap();
        let n = conn.poll_notification(deadline()).await?;
        assert_eq!(n, Some(Notification::DeviceListUpdated));
        Ok(())
    }

    #[tokio::test]
    async fn test_poll_notification_reads_frame() -> OpenRgbResult<()> {
        let mock = Builder::new()
            .negotiate_protocol(1)
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&100_u32.to_le_bytes())
            .read(&0_u32.to_le_bytes())
            .build();
        let mut conn = connect(mock).await?;

        let n = conn.poll_notification(deadline()).await?;
        assert_eq!(n, Some(Notification::DeviceListUpdated));
        Ok(())
    }

    #[tokio::test]
    async fn test_calls_before_connect_and_after_close() -> OpenRgbResult<()> {
        let mut conn = Connection::<Mock>::new(MAX_BODY_SIZE);
        let err = conn
            .request(0, &Message::RequestControllerCount, deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, OpenRgbError::NotConnected));

        let mock = Builder::new().negotiate_protocol(1).build();
        conn.open(mock, None, deadline()).await?;
        assert_eq!(conn.state(), ConnectionState::Connected);

        conn.close().await;
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        let err = conn
            .send_message(0, &Message::SetCustomMode)
            .await
            .unwrap_err();
        assert!(matches!(err, OpenRgbError::NotConnected));
        Ok(())
    }

    #[tokio::test]
    async fn test_open_twice_is_already_connected() -> OpenRgbResult<()> {
        let mock = Builder::new().negotiate_protocol(1).build();
        let mut conn = connect(mock).await?;

        let second = Builder::new().build();
        let err = conn.open(second, None, deadline()).await.unwrap_err();
        assert!(matches!(err, OpenRgbError::AlreadyConnected));
        assert_eq!(conn.state(), ConnectionState::Connected);
        Ok(())
    }
}
