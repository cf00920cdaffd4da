use crate::OpenRgbResult;
use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};

/// A single LED.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Led {
    /// LED name.
    name: String,

    /// Device specific LED value.
    value: u32,
}

impl Led {
    /// Builds an LED description.
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Returns the name of this LED.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device specific value of this LED.
    pub fn value(&self) -> u32 {
        self.value
    }
}

impl DeserFromBuf for Led {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self>
    where
        Self: Sized,
    {
        Ok(Led {
            name: buf.read_value()?,
            value: buf.read_value()?,
        })
    }
}

impl SerToBuf for Led {
    fn wire_size(&self) -> usize {
        self.name.wire_size() + self.value.wire_size()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.push_value(&self.name)?.push_value(&self.value)?;
        Ok(())
    }
}
