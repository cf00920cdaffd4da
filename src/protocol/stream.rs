use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;

use crate::protocol::{Message, PacketHeader, ReceivedMessage, WriteMessage};
use crate::{OpenRgbError, OpenRgbResult};

/// Default cap on a frame's declared body size.
pub(crate) const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Framed transport over a byte stream.
///
/// Writes serialize the whole frame into one buffer and hand it to a single
/// `write_all`; reads are two length-exact passes, header then body. Any
/// failure (short read, reset, deadline, oversized body) latches the stream
/// broken: a partial frame cannot be resumed because framing is by length,
/// not delimiter.
///
/// Generic over the stream so tests can drive it with a mock.
pub(crate) struct ProtocolStream<S> {
    stream: S,
    protocol_version: u32,
    max_body_size: usize,
    broken: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ProtocolStream<S> {
    pub fn new(stream: S, protocol_version: u32) -> Self {
        Self::with_body_cap(stream, protocol_version, MAX_BODY_SIZE)
    }

    pub fn with_body_cap(stream: S, protocol_version: u32, max_body_size: usize) -> Self {
        Self {
            stream,
            protocol_version,
            max_body_size,
            broken: false,
        }
    }

    /// Pins the version negotiated during the handshake; it tags every
    /// cursor this stream creates from then on.
    pub fn set_protocol_version(&mut self, version: u32) {
        self.protocol_version = version;
    }

    fn fail(&mut self, err: OpenRgbError) -> OpenRgbError {
        self.broken = true;
        err
    }

    fn check_usable(&self) -> OpenRgbResult<()> {
        if self.broken {
            return Err(OpenRgbError::Disconnected { source: None });
        }
        Ok(())
    }

    /// Writes one whole frame.
    pub async fn send_message(&mut self, device_id: u32, msg: &Message) -> OpenRgbResult<()> {
        self.check_usable()?;
        let body_size = msg.body_size();
        let mut buf =
            WriteMessage::with_capacity(self.protocol_version, PacketHeader::SIZE + body_size);
        PacketHeader::new(device_id, msg.packet_id(), body_size as u32).serialize(&mut buf);
        msg.write_body(&mut buf)?;
        debug_assert_eq!(buf.len(), PacketHeader::SIZE + body_size);

        tracing::trace!("Writing frame: {}", buf);
        let res = self.stream.write_all(buf.bytes()).await;
        res.map_err(|e| self.fail(OpenRgbError::Disconnected { source: Some(e) }))
    }

    /// Reads exactly one frame: 16 header bytes, then the declared body.
    pub async fn recv_frame(&mut self, deadline: Instant) -> OpenRgbResult<(PacketHeader, Vec<u8>)> {
        match self.recv_frame_inner(deadline, false).await? {
            Some(frame) => Ok(frame),
            // unreachable: idle returns are only produced with idle_ok
            None => Err(OpenRgbError::Timeout {
                operation: "Frame read",
            }),
        }
    }

    /// Like [`Self::recv_frame`], but a deadline that fires before the first
    /// header byte arrives returns `Ok(None)` and leaves the stream healthy.
    /// A deadline firing mid-frame is still fatal.
    pub async fn recv_frame_opt(
        &mut self,
        deadline: Instant,
    ) -> OpenRgbResult<Option<(PacketHeader, Vec<u8>)>> {
        self.recv_frame_inner(deadline, true).await
    }

    async fn recv_frame_inner(
        &mut self,
        deadline: Instant,
        idle_ok: bool,
    ) -> OpenRgbResult<Option<(PacketHeader, Vec<u8>)>> {
        self.check_usable()?;

        let mut header_buf = [0u8; PacketHeader::SIZE];
        let res = read_exact_or_deadline(
            &mut self.stream,
            &mut header_buf,
            deadline,
            "Frame header read",
            idle_ok,
        )
        .await;
        if !res.map_err(|e| self.fail(e))? {
            return Ok(None);
        }

        let mut cursor = ReceivedMessage::new(&header_buf, self.protocol_version);
        let header = PacketHeader::deserialize(&mut cursor).map_err(|e| self.fail(e))?;
        tracing::trace!(
            "Read header: device {}, packet {:?}, body {} bytes",
            header.device_id,
            header.packet_id,
            header.body_size
        );

        let body_size = header.body_size as usize;
        if body_size > self.max_body_size {
            return Err(self.fail(OpenRgbError::OverSized {
                size: body_size,
                cap: self.max_body_size,
            }));
        }

        let mut body = vec![0u8; body_size];
        let res = read_exact_or_deadline(
            &mut self.stream,
            &mut body,
            deadline,
            "Frame body read",
            false,
        )
        .await;
        res.map_err(|e| self.fail(e))?;

        Ok(Some((header, body)))
    }

    /// Shuts the write half down; used for the orderly close path.
    pub async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
        self.broken = true;
    }
}

/// Fills `buf` before `deadline`. Returns `Ok(false)` iff `idle_ok` is set
/// and the deadline fired with nothing consumed.
async fn read_exact_or_deadline<S: AsyncRead + Unpin>(
    stream: &mut S,
    buf: &mut [u8],
    deadline: Instant,
    operation: &'static str,
    idle_ok: bool,
) -> OpenRgbResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let res = tokio::time::timeout_at(deadline, stream.read(&mut buf[filled..])).await;
        match res {
            Err(_elapsed) if idle_ok && filled == 0 => return Ok(false),
            Err(_elapsed) => return Err(OpenRgbError::Timeout { operation }),
            Ok(Ok(0)) => return Err(OpenRgbError::Disconnected { source: None }),
            Ok(Ok(n)) => filled += n,
            Ok(Err(e)) => return Err(OpenRgbError::Disconnected { source: Some(e) }),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_test::io::Builder;

    use super::*;
    use crate::protocol::data::Color;
    use crate::protocol::{PROTOCOL_VERSION, PacketId};

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_send_message() -> OpenRgbResult<()> {
        let mock = Builder::new()
            .write(b"ORGB")
            .write(&0_u32.to_le_bytes()) // device id
            .write(&50_u32.to_le_bytes()) // packet id
            .write(&6_u32.to_le_bytes()) // body size
            .write(&[0x04, 0x00, 0x66, 0x6F, 0x6F, 0x00])
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        stream
            .send_message(
                0,
                &Message::SetClientName {
                    name: "foo".to_string(),
                },
            )
            .await
    }

    #[tokio::test]
    async fn test_recv_frame() -> OpenRgbResult<()> {
        let mock = Builder::new()
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&0_u32.to_le_bytes())
            .read(&4_u32.to_le_bytes())
            .read(&7_u32.to_le_bytes())
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        let (header, body) = stream.recv_frame(far_deadline()).await?;
        assert_eq!(header.packet_id, PacketId::RequestControllerCount);
        assert_eq!(header.body_size, 4);
        assert_eq!(body, 7_u32.to_le_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn test_recv_split_reads() -> OpenRgbResult<()> {
        // header and body arriving in awkward chunks still frame correctly
        let mock = Builder::new()
            .read(b"OR")
            .read(b"GB")
            .read(&[0, 0, 0, 0, 40, 0, 0])
            .read(&[0, 4, 0, 0, 0, 1, 0])
            .read(&[0, 0])
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        let (header, body) = stream.recv_frame(far_deadline()).await?;
        assert_eq!(header.packet_id, PacketId::RequestProtocolVersion);
        assert_eq!(body, 1_u32.to_le_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_body_breaks_stream() {
        let mock = Builder::new()
            .read(b"ORGB")
            .read(&1_u32.to_le_bytes())
            .read(&1_u32.to_le_bytes())
            .read(&100_u32.to_le_bytes())
            .build();
        let mut stream = ProtocolStream::with_body_cap(mock, PROTOCOL_VERSION, 64);
        let err = stream.recv_frame(far_deadline()).await.unwrap_err();
        assert!(matches!(
            err,
            OpenRgbError::OverSized { size: 100, cap: 64 }
        ));

        // stream is latched broken
        let err = stream.recv_frame(far_deadline()).await.unwrap_err();
        assert!(matches!(err, OpenRgbError::Disconnected { .. }));
        let err = stream
            .send_message(0, &Message::RequestControllerCount)
            .await
            .unwrap_err();
        assert!(matches!(err, OpenRgbError::Disconnected { .. }));
    }

    #[tokio::test]
    async fn test_recv_eof() {
        let mock = Builder::new().read(b"").build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        let err = stream.recv_frame(far_deadline()).await.unwrap_err();
        assert!(matches!(err, OpenRgbError::Disconnected { source: None }));
    }

    #[tokio::test]
    async fn test_recv_reset() {
        let mock = Builder::new()
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset by peer",
            ))
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        let err = stream.recv_frame(far_deadline()).await.unwrap_err();
        assert!(matches!(
            err,
            OpenRgbError::Disconnected { source: Some(_) }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recv_timeout_mid_frame() {
        // header arrives, body never does: the deadline is fatal
        let mock = Builder::new()
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&0_u32.to_le_bytes())
            .read(&4_u32.to_le_bytes())
            .wait(Duration::from_secs(60))
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        let deadline = Instant::now() + Duration::from_secs(5);
        let err = stream.recv_frame(deadline).await.unwrap_err();
        assert!(matches!(err, OpenRgbError::Timeout { .. }));

        let err = stream.recv_frame(far_deadline()).await.unwrap_err();
        assert!(matches!(err, OpenRgbError::Disconnected { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recv_opt_idle_deadline() -> OpenRgbResult<()> {
        let mock = Builder::new()
            .wait(Duration::from_secs(60))
            .read(b"ORGB")
            .read(&0_u32.to_le_bytes())
            .read(&100_u32.to_le_bytes())
            .read(&0_u32.to_le_bytes())
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);

        // nothing on the wire yet: not an error, stream stays healthy
        let deadline = Instant::now() + Duration::from_secs(1);
        assert!(stream.recv_frame_opt(deadline).await?.is_none());

        // the frame shows up later
        let (header, body) = stream.recv_frame(far_deadline()).await?;
        assert_eq!(header.packet_id, PacketId::DeviceListUpdated);
        assert!(body.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_recv_bad_magic() {
        let mock = Builder::new()
            .read(b"RGBO")
            .read(&[0; 12])
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        let err = stream.recv_frame(far_deadline()).await.unwrap_err();
        assert!(matches!(err, OpenRgbError::BadMagic(_)));
    }

    #[tokio::test]
    async fn test_update_leds_frame_bytes() -> OpenRgbResult<()> {
        // frame for UpdateLeds carries the data_size mirror after the header
        let mock = Builder::new()
            .write(b"ORGB")
            .write(&3_u32.to_le_bytes())
            .write(&1050_u32.to_le_bytes())
            .write(&10_u32.to_le_bytes()) // body size
            .write(&[10, 0, 0, 0, 1, 0, 255, 128, 0, 0])
            .build();
        let mut stream = ProtocolStream::new(mock, PROTOCOL_VERSION);
        stream
            .send_message(
                3,
                &Message::UpdateLeds {
                    colors: vec![Color {
                        r: 255,
                        g: 128,
                        b: 0,
                    }],
                },
            )
            .await
    }
}
