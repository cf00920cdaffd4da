use crate::protocol::{PacketId, ReceivedMessage, WriteMessage};
use crate::{OpenRgbError, OpenRgbResult};

/// Magic value starting every frame.
pub(crate) const MAGIC: [u8; 4] = *b"ORGB";

/// Fixed 16-byte frame header: magic, device ID, packet ID, body size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct PacketHeader {
    pub device_id: u32,
    pub packet_id: PacketId,
    pub body_size: u32,
}

impl PacketHeader {
    /// Serialized header length.
    pub const SIZE: usize = 16;

    pub fn new(device_id: u32, packet_id: PacketId, body_size: u32) -> Self {
        Self {
            device_id,
            packet_id,
            body_size,
        }
    }

    /// Writes the 16 header bytes: magic, device ID, packet ID, body size.
    pub fn serialize(&self, buf: &mut WriteMessage) {
        buf.write_slice(&MAGIC);
        buf.write_u32(self.device_id);
        buf.write_u32(self.packet_id.code());
        buf.write_u32(self.body_size);
    }

    /// Reads a header back. Fails with `BadMagic` or `UnknownPacketId`;
    /// `body_size` is returned verbatim, the transport enforces the cap.
    pub fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        let magic = buf.read_value::<[u8; 4]>()?;
        if magic != MAGIC {
            return Err(OpenRgbError::BadMagic(magic));
        }
        let device_id = buf.read_u32()?;
        let code = buf.read_u32()?;
        let packet_id = PacketId::from_code(code).ok_or(OpenRgbError::UnknownPacketId(code))?;
        let body_size = buf.read_u32()?;
        Ok(Self {
            device_id,
            packet_id,
            body_size,
        })
    }
}
