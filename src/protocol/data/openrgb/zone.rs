use array2d::Array2D;

use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};
use crate::{OpenRgbError, OpenRgbResult, impl_enum_discriminant};

/// Type of zones available.
///
/// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation#zone-data) for more information.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum ZoneType {
    /// Single zone.
    Single = 0,

    /// Linear zone.
    Linear = 1,

    /// Matrix zone.
    Matrix = 2,
}

impl_enum_discriminant!(ZoneType, Single: 0, Linear: 1, Matrix: 2);

/// RGB controller zone.
///
/// The trailing matrix block is present iff the 16-bit `matrix_length` word
/// is nonzero, in which case it must equal `8 + 4 * height * width`.
///
/// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation#zone-data) for more information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ZoneData {
    /// Id of this zone.
    ///
    /// Not part of the packet, but set right after reading
    /// since the sender knows the zone id.
    pub(crate) id: usize,

    /// Zone name.
    name: String,

    /// Zone type.
    zone_type: ZoneType,

    /// Zone minimum LED number.
    ///
    /// Minimum number of LEDs if this zone is resizable.
    leds_min: u32,

    /// Zone maximum LED number.
    ///
    /// Maximum number of LEDs if this zone is resizable.
    leds_max: u32,

    /// Zone LED count.
    leds_count: u32,

    /// Zone LED matrix (if [ZoneData::zone_type] is [ZoneType::Matrix]).
    ///
    /// Matrix is the "position" of the LEDs in the zone relative to the top left corner.
    ///
    /// The value represents the LED id of the LED at that position.
    /// A value of `u32::MAX` means that there is no led present.
    matrix: Option<Array2D<u32>>,
}

impl ZoneData {
    /// Id of this zone.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the name of this zone.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// [`ZoneType`] of this zone.
    pub fn zone_type(&self) -> ZoneType {
        self.zone_type
    }

    /// Minimum number of LEDs for this zone if it is resizable.
    pub fn leds_min(&self) -> usize {
        self.leds_min as usize
    }

    /// Maximum number of LEDs for this zone if it is resizable.
    pub fn leds_max(&self) -> usize {
        self.leds_max as usize
    }

    /// Number of LEDs in this zone.
    pub fn leds_count(&self) -> usize {
        self.leds_count as usize
    }

    /// LED matrix of this zone.
    ///
    /// If [`Self::zone_type()`] is [`ZoneType::Matrix`], this will return `Some`.
    pub fn matrix(&self) -> Option<&Array2D<u32>> {
        self.matrix.as_ref()
    }

    /// Length word of the matrix block: 0 when absent, `8 + 4 * h * w` when present.
    fn matrix_length(&self) -> u16 {
        match &self.matrix {
            None => 0,
            Some(m) => (2 * size_of::<u32>() + size_of::<u32>() * m.num_elements()) as u16,
        }
    }
}

impl DeserFromBuf for ZoneData {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        let name = buf.read_value()?;
        let zone_type = buf.read_value()?;
        let leds_min = buf.read_value()?;
        let leds_max = buf.read_value()?;
        let leds_count = buf.read_value()?;
        let matrix_len = buf.read_u16()? as usize;
        let matrix = match matrix_len {
            0 => None,
            _ => Some({
                let matrix_height = buf.read_u32()? as usize;
                let matrix_width = buf.read_u32()? as usize;
                let declared = 2 * size_of::<u32>() + size_of::<u32>() * matrix_height * matrix_width;
                if matrix_len != declared {
                    return Err(OpenRgbError::Malformed(format!(
                        "Zone matrix length {matrix_len} does not match {matrix_height}x{matrix_width} matrix ({declared} bytes)"
                    )));
                }
                let matrix_data = buf.read_n_values::<u32>(matrix_height * matrix_width)?;
                Array2D::from_row_major(&matrix_data, matrix_height, matrix_width).map_err(
                    |e| OpenRgbError::Malformed(format!("Failed building zone matrix: {e}")),
                )?
            }),
        };

        Ok(Self {
            id: usize::MAX,
            name,
            zone_type,
            leds_min,
            leds_max,
            leds_count,
            matrix,
        })
    }
}

impl SerToBuf for ZoneData {
    fn wire_size(&self) -> usize {
        self.name.wire_size()
            + self.zone_type.wire_size()
            + 3 * size_of::<u32>() // leds_min, leds_max, leds_count
            + size_of::<u16>() // matrix length word
            + self.matrix_length() as usize
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.push_value(&self.name)?
            .push_value(&self.zone_type)?
            .push_value(&self.leds_min)?
            .push_value(&self.leds_max)?
            .push_value(&self.leds_count)?;
        buf.write_u16(self.matrix_length());
        if let Some(matrix) = &self.matrix {
            buf.write_u32(matrix.num_rows() as u32);
            buf.write_u32(matrix.num_columns() as u32);
            for cell in matrix.elements_row_major_iter() {
                buf.write_u32(*cell);
            }
        }
        Ok(())
    }
}
