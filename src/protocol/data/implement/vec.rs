use crate::OpenRgbResult;
use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};

impl<T: DeserFromBuf> DeserFromBuf for Vec<T> {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self>
    where
        Self: Sized,
    {
        let len = buf.read_u16()? as usize;
        let mut vec = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(T::deserialize(buf)?);
        }
        Ok(vec)
    }
}

impl<T: SerToBuf> SerToBuf for Vec<T> {
    fn wire_size(&self) -> usize {
        size_of::<u16>() + self.iter().map(SerToBuf::wire_size).sum::<usize>()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.write_u16(self.len() as u16);
        for t in self {
            buf.write_value(t)?;
        }
        Ok(())
    }
}
