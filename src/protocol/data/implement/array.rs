use std::mem::MaybeUninit;

use crate::OpenRgbResult;
use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};

impl<T: SerToBuf, const N: usize> SerToBuf for [T; N] {
    fn wire_size(&self) -> usize {
        self.iter().map(SerToBuf::wire_size).sum()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        for item in self {
            item.serialize(buf)?;
        }
        Ok(())
    }
}

impl<T: DeserFromBuf, const N: usize> DeserFromBuf for [T; N] {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        let mut arr = [const { MaybeUninit::<T>::uninit() }; N];

        for item in arr.iter_mut() {
            let d = T::deserialize(buf)?;
            item.write(d);
        }

        // the for loop either writes to every element of the array or returns an error
        unsafe { Ok(std::mem::transmute_copy(&arr)) }
    }
}
