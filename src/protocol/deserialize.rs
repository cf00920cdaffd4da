use crate::{OpenRgbError, OpenRgbResult};

/// Deserialize an object from a byte buffer.
pub(crate) trait DeserFromBuf {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self>
    where
        Self: Sized;
}

/// Bounded input cursor over a received message body.
///
/// All primitives are read little-endian. A read past the end of the buffer
/// fails with [`OpenRgbError::Truncated`]; the cursor does not advance on
/// failure.
pub(crate) struct ReceivedMessage<'a> {
    protocol_version: u32,
    buf: &'a [u8],
    idx: usize,
}

impl std::fmt::Display for ReceivedMessage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Received (protocol: {}, offset: {}): {:?})",
            self.protocol_version,
            self.idx,
            self.available_buf()
        )
    }
}

impl<'a> ReceivedMessage<'a> {
    pub fn new(buf: &'a [u8], protocol_version: u32) -> Self {
        Self {
            protocol_version,
            buf,
            idx: 0,
        }
    }

    #[allow(unused)] // negotiated version travels with the cursor even while no field is gated on it
    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Total length of the underlying buffer, consumed bytes included.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.idx
    }

    fn available_buf(&self) -> &[u8] {
        &self.buf[self.idx..]
    }

    /// Consumes the next `len` bytes.
    pub fn read_slice(&mut self, len: usize) -> OpenRgbResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(OpenRgbError::Truncated {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.idx..self.idx + len];
        self.idx += len;
        Ok(slice)
    }

    #[inline]
    pub fn read_u8(&mut self) -> OpenRgbResult<u8> {
        let b = self.read_slice(size_of::<u8>())?;
        Ok(b[0])
    }

    pub fn read_u16(&mut self) -> OpenRgbResult<u16> {
        let b = self.read_slice(size_of::<u16>())?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> OpenRgbResult<u32> {
        let b = self.read_slice(size_of::<u32>())?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_value<T: DeserFromBuf>(&mut self) -> OpenRgbResult<T> {
        T::deserialize(self)
    }

    /// Reads the next `n` values as type `T` from the buffer.
    ///
    /// If there's a `[len, [..data]]` format, use `read_value::<Vec<T>>()` instead.
    pub fn read_n_values<T: DeserFromBuf>(&mut self, n: usize) -> OpenRgbResult<Vec<T>> {
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            values.push(T::deserialize(self)?);
        }
        Ok(values)
    }
}
