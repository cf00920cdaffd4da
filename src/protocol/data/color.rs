use rgb::RGB8;

use crate::OpenRgbResult;
use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};

/// RGB controller color, aliased to [rgb] crate's [RGB8] type.
///
/// On the wire a color is 4 bytes: `R`, `G`, `B`, then a zero pad byte.
pub type Color = RGB8;

impl DeserFromBuf for Color {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        let r = buf.read_u8()?;
        let g = buf.read_u8()?;
        let b = buf.read_u8()?;
        let _ = buf.read_u8()?; // pad byte
        Ok(Color { r, g, b })
    }
}

impl SerToBuf for Color {
    fn wire_size(&self) -> usize {
        4
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.write_u8(self.r);
        buf.write_u8(self.g);
        buf.write_u8(self.b);
        buf.write_u8(0u8); // pad byte
        Ok(())
    }
}
