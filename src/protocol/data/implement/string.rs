use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};
use crate::{OpenRgbError, OpenRgbResult};

impl DeserFromBuf for String {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self>
    where
        Self: Sized,
    {
        let len = buf.read_u16()? as usize;
        let mut bytes = buf.read_slice(len)?.to_vec();
        bytes.pop(); // drop the NUL terminator counted in len
        String::from_utf8(bytes).map_err(|e| {
            OpenRgbError::Malformed(format!("Failed decoding string as UTF-8: {e}"))
        })
    }
}

impl SerToBuf for String {
    fn wire_size(&self) -> usize {
        self.as_str().wire_size()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        self.as_str().serialize(buf)
    }
}

impl SerToBuf for &str {
    fn wire_size(&self) -> usize {
        // length word + bytes + NUL terminator
        size_of::<u16>() + self.len() + 1
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.write_u16(self.len() as u16 + 1); // +1 for NUL terminator
        buf.write_slice(self.as_bytes());
        buf.write_u8(b'\0');
        Ok(())
    }
}
