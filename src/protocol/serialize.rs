use crate::OpenRgbResult;
#[cfg(test)]
use crate::protocol::ReceivedMessage;

/// Serialize an object to a byte buffer.
///
/// [`SerToBuf::wire_size`] must return the exact number of bytes
/// [`SerToBuf::serialize`] appends, so callers can size a frame buffer before
/// writing it.
pub(crate) trait SerToBuf {
    /// Exact serialized size in bytes, computed from the current contents.
    fn wire_size(&self) -> usize;

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()>;
}

impl<T: SerToBuf> SerToBuf for &T {
    fn wire_size(&self) -> usize {
        (*self).wire_size()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        (*self).serialize(buf)
    }
}

/// Append-only output cursor over a growable byte buffer.
///
/// All primitives are written little-endian. Writes never fail; the buffer
/// grows as needed, and callers that pre-sized it with
/// [`SerToBuf::wire_size`] never reallocate.
pub(crate) struct WriteMessage {
    protocol_version: u32,
    buf: Vec<u8>,
}

impl std::fmt::Display for WriteMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WriteMessage (protocol: {}, len: {}): {:?}",
            self.protocol_version,
            self.buf.len(),
            &self.buf[..]
        )
    }
}

impl WriteMessage {
    pub fn new(protocol_version: u32) -> Self {
        Self::with_capacity(protocol_version, 8)
    }

    pub fn with_capacity(protocol_version: u32, capacity: usize) -> Self {
        Self {
            protocol_version,
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    #[allow(unused)] // negotiated version travels with the cursor even while no field is gated on it
    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_slice(&mut self, slice: &[u8]) {
        self.buf.extend_from_slice(slice);
    }

    pub fn write_value<T: SerToBuf>(&mut self, value: &T) -> OpenRgbResult<()> {
        value.serialize(self)
    }

    pub fn push_value<T: SerToBuf>(&mut self, value: &T) -> OpenRgbResult<&mut Self> {
        self.write_value(value)?;
        Ok(self)
    }

    #[cfg(test)]
    pub fn to_received_msg(&self) -> ReceivedMessage<'_> {
        ReceivedMessage::new(&self.buf, self.protocol_version)
    }
}
