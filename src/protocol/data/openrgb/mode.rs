use flagset::{FlagSet, flags};

use crate::protocol::data::Color;
use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};
use crate::{OpenRgbResult, impl_enum_discriminant};

flags! {
    /// RGB controller mode flags.
    ///
    /// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation) for more information.
    pub enum ModeFlag: u32 {
        /// Mode has speed parameter.
        HasSpeed = 1 << 0,

        /// Mode has left/right parameter.
        HasDirectionLR = 1 << 1,

        /// Mode has up/down parameter.
        HasDirectionUD = 1 << 2,

        /// Mode has horiz/vert parameter.
        HasDirectionHV = 1 << 3,

        /// Mode has direction parameter.
        HasDirection = (ModeFlag::HasDirectionLR | ModeFlag::HasDirectionUD | ModeFlag::HasDirectionHV).bits(),

        /// Mode has brightness parameter.
        HasBrightness = 1 << 4,

        /// Mode has per-LED colors.
        HasPerLEDColor = 1 << 5,

        /// Mode has mode specific colors.
        HasModeSpecificColor = 1 << 6,

        /// Mode has random color option.
        HasRandomColor = 1 << 7,
    }
}

/// Direction for [ModeData].
#[derive(Eq, PartialEq, Debug, Copy, Clone, Default)]
pub enum Direction {
    /// Left direction.
    #[default]
    Left = 0,

    /// Right direction.
    Right = 1,

    /// Up direction.
    Up = 2,

    /// Down direction.
    Down = 3,

    /// Horizontal direction.
    Horizontal = 4,

    /// Vertical direction.
    Vertical = 5,
}

impl_enum_discriminant!(
    Direction,
    Left: 0,
    Right: 1,
    Up: 2,
    Down: 3,
    Horizontal: 4,
    Vertical: 5
);

/// RGB controller color mode.
///
/// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation) for more information.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Default)]
pub enum ColorMode {
    /// No color mode.
    #[default]
    None = 0,

    /// Per LED colors.
    PerLED = 1,

    /// Mode specific colors.
    ModeSpecific = 2,

    /// Random colors.
    Random = 3,
}

impl_enum_discriminant!(ColorMode, None: 0, PerLED: 1, ModeSpecific: 2, Random: 3);

/// RGB controller mode.
///
/// Several fields are meaningful only when the corresponding [ModeFlag] bit
/// is set; the wire layout always carries all of them. Flag bits the client
/// does not recognise are kept verbatim and written back unchanged.
///
/// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation#mode-data) for more information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ModeData {
    /// Mode name.
    name: String,

    /// Device specific mode value
    value: i32,

    /// Mode flag bits, unknown bits included.
    flags: u32,

    /// Mode minimum speed (if mode has [ModeFlag::HasSpeed] flag).
    speed_min: u32,

    /// Mode maximum speed (if mode has [ModeFlag::HasSpeed] flag).
    speed_max: u32,

    /// Mode minimum colors (if mode has non empty [ModeData::colors] list).
    colors_min: u32,

    /// Mode maximum colors (if mode has non empty [ModeData::colors] list).
    colors_max: u32,

    /// Mode speed (if mode has [ModeFlag::HasSpeed] flag).
    speed: u32,

    /// Mode direction.
    direction: Direction,

    /// Mode color mode.
    color_mode: ColorMode,

    /// Mode colors.
    colors: Vec<Color>,

    /// Index of this mode, not part of received packet but set right after reading
    id: u32,
}

impl ModeData {
    /// Returns the name of this mode.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ID of this mode.
    pub fn id(&self) -> usize {
        self.id as usize
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id as u32;
    }

    /// Returns the device specific value of this mode.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Returns the recognised flags of this mode.
    ///
    /// Unknown bits are dropped from the view but stay in the record; use
    /// [`Self::flag_bits`] for the raw value.
    pub fn flags(&self) -> FlagSet<ModeFlag> {
        FlagSet::new_truncated(self.flags)
    }

    /// Returns the raw flag bits of this mode.
    pub fn flag_bits(&self) -> u32 {
        self.flags
    }

    /// Returns the speed setting of this mode.
    ///
    /// If `ModeFlag::HasSpeed` is not set, returns `None`.
    pub fn speed(&self) -> Option<u32> {
        self.flags()
            .contains(ModeFlag::HasSpeed)
            .then_some(self.speed)
    }

    /// Set the speed setting of this mode.
    pub fn set_speed(&mut self, sp: u32) {
        if self.flags().contains(ModeFlag::HasSpeed) {
            self.speed = sp;
        }
    }

    /// Returns the minimum speed setting of this mode.
    ///
    /// If `ModeFlag::HasSpeed` is not set, returns `None`.
    pub fn speed_min(&self) -> Option<u32> {
        self.flags()
            .contains(ModeFlag::HasSpeed)
            .then_some(self.speed_min)
    }

    /// Returns the maximum speed setting of this mode.
    ///
    /// If `ModeFlag::HasSpeed` is not set, returns `None`.
    pub fn speed_max(&self) -> Option<u32> {
        self.flags()
            .contains(ModeFlag::HasSpeed)
            .then_some(self.speed_max)
    }

    /// Returns the direction of this mode.
    ///
    /// If none of the direction flags are set, returns `None`.
    pub fn direction(&self) -> Option<Direction> {
        let has_direction = !(self.flags() & ModeFlag::HasDirection).is_empty();
        has_direction.then_some(self.direction)
    }

    /// Set the direction of this mode.
    pub fn set_direction(&mut self, direction: Direction) {
        if !(self.flags() & ModeFlag::HasDirection).is_empty() {
            self.direction = direction;
        }
    }

    /// Returns the color mode of this mode.
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Returns the colors of this mode
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Replaces the colors of this mode.
    ///
    /// The server clamps the list to `colors_min..=colors_max`; the client
    /// sends it verbatim.
    pub fn set_colors(&mut self, colors: Vec<Color>) {
        self.colors = colors;
    }

    /// Returns the minimum number of colors for this mode.
    ///
    /// Returns `None` if the mode does not have any colors.
    pub fn colors_min(&self) -> Option<u32> {
        (!self.colors.is_empty()).then_some(self.colors_min)
    }

    /// Returns the maximum number of colors for this mode.
    ///
    /// Returns `None` if the mode does not have any colors.
    pub fn colors_max(&self) -> Option<u32> {
        (!self.colors.is_empty()).then_some(self.colors_max)
    }
}

impl DeserFromBuf for ModeData {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        let name = buf.read_value()?;
        let value = buf.read_value()?;
        let flags = buf.read_u32()?;
        let speed_min = buf.read_value()?;
        let speed_max = buf.read_value()?;
        let colors_min = buf.read_value()?;
        let colors_max = buf.read_value()?;
        let speed = buf.read_value()?;
        let direction = buf.read_value::<Direction>()?;
        let color_mode = buf.read_value()?;
        let colors = buf.read_value::<Vec<Color>>()?;

        Ok(ModeData {
            id: u32::MAX,
            name,
            value,
            flags,
            speed_min,
            speed_max,
            colors_min,
            colors_max,
            speed,
            direction,
            color_mode,
            colors,
        })
    }
}

impl SerToBuf for ModeData {
    fn wire_size(&self) -> usize {
        self.name.wire_size()
            + 7 * size_of::<u32>() // value, flags, speed_min/max, colors_min/max, speed
            + self.direction.wire_size()
            + self.color_mode.wire_size()
            + self.colors.wire_size()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.push_value(&self.name)?
            .push_value(&self.value)?
            .push_value(&self.flags)?
            .push_value(&self.speed_min)?
            .push_value(&self.speed_max)?
            .push_value(&self.colors_min)?
            .push_value(&self.colors_max)?
            .push_value(&self.speed)?
            .push_value(&self.direction)?
            .push_value(&self.color_mode)?
            .push_value(&self.colors)?;
        Ok(())
    }
}
