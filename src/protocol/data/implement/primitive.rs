use crate::OpenRgbResult;
use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};

impl DeserFromBuf for () {
    fn deserialize(_buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        Ok(())
    }
}

impl SerToBuf for () {
    fn wire_size(&self) -> usize {
        0
    }

    fn serialize(&self, _buf: &mut WriteMessage) -> OpenRgbResult<()> {
        Ok(())
    }
}

impl DeserFromBuf for u8 {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        buf.read_u8()
    }
}

impl SerToBuf for u8 {
    fn wire_size(&self) -> usize {
        size_of::<u8>()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.write_u8(*self);
        Ok(())
    }
}

impl DeserFromBuf for u16 {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        buf.read_u16()
    }
}

impl SerToBuf for u16 {
    fn wire_size(&self) -> usize {
        size_of::<u16>()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.write_u16(*self);
        Ok(())
    }
}

impl DeserFromBuf for u32 {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        buf.read_u32()
    }
}

impl SerToBuf for u32 {
    fn wire_size(&self) -> usize {
        size_of::<u32>()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.write_u32(*self);
        Ok(())
    }
}

impl DeserFromBuf for i32 {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        let x = buf.read_u32()?;
        Ok(x as i32)
    }
}

impl SerToBuf for i32 {
    fn wire_size(&self) -> usize {
        size_of::<i32>()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.write_u32(*self as u32);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::protocol::{PROTOCOL_VERSION, ReceivedMessage, SerToBuf, WriteMessage};

    #[test]
    fn test_read_void() -> Result<(), Box<dyn Error>> {
        let mut msg = ReceivedMessage::new(&[0, 1, 2, 3, 4], PROTOCOL_VERSION);
        let _: () = msg.read_value()?;
        assert_eq!(msg.remaining(), 5);
        Ok(())
    }

    #[test]
    fn test_read_u8() -> Result<(), Box<dyn Error>> {
        let mut msg = ReceivedMessage::new(&[0, 1, 2, 3, 4], PROTOCOL_VERSION);
        assert_eq!(msg.read_u8()?, 0);
        assert_eq!(msg.read_value::<u8>()?, 1);
        Ok(())
    }

    #[test]
    fn test_read_u16() -> Result<(), Box<dyn Error>> {
        let mut msg = ReceivedMessage::new(&[0, 1, 2, 3, 4], PROTOCOL_VERSION);
        assert_eq!(msg.read_u16()?, u16::from_le_bytes([0, 1]));
        assert_eq!(msg.read_value::<u16>()?, u16::from_le_bytes([2, 3]));
        assert!(msg.read_value::<u16>().is_err()); // not enough data
        Ok(())
    }

    #[test]
    fn test_read_u32() -> Result<(), Box<dyn Error>> {
        let mut msg = ReceivedMessage::new(&[0, 1, 2, 3, 4], PROTOCOL_VERSION);
        assert_eq!(msg.read_u32()?, u32::from_le_bytes([0, 1, 2, 3]));
        assert!(msg.read_value::<u32>().is_err());
        Ok(())
    }

    #[test]
    fn test_read_i32() -> Result<(), Box<dyn Error>> {
        let mut buf = WriteMessage::new(PROTOCOL_VERSION);
        let mut msg = buf.push_value(&(-1337_i32))?.to_received_msg();
        assert_eq!(msg.read_value::<i32>()?, -1337);
        Ok(())
    }

    #[test]
    fn test_wire_sizes() -> Result<(), Box<dyn Error>> {
        for value in [0_u32, 1, u32::MAX] {
            let mut buf = WriteMessage::new(PROTOCOL_VERSION);
            buf.write_value(&value)?;
            assert_eq!(buf.len(), value.wire_size());
        }
        assert_eq!(().wire_size(), 0);
        assert_eq!(0_u8.wire_size(), 1);
        assert_eq!(0_u16.wire_size(), 2);
        assert_eq!(0_i32.wire_size(), 4);
        Ok(())
    }
}
