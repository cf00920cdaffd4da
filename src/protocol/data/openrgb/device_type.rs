use crate::impl_enum_discriminant;

/// RGB controller device type.
///
/// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation) for more information.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub enum DeviceType {
    /// Motherboard.
    Motherboard = 0,
    /// DRAM
    DRam = 1,
    /// GPU
    Gpu = 2,
    /// Cooler
    Cooler = 3,
    /// LED strip
    LEDStrip = 4,
    /// Keyboard
    Keyboard = 5,
    /// Mouse
    Mouse = 6,
    /// Mouse mat
    MouseMat = 7,
    /// Headset
    Headset = 8,
    /// Headset stand
    HeadsetStand = 9,
    /// Gamepad
    Gamepad = 10,
    /// Unknown
    Unknown = 11,
}

impl_enum_discriminant!(DeviceType,
    Motherboard: 0,
    DRam: 1,
    Gpu: 2,
    Cooler: 3,
    LEDStrip: 4,
    Keyboard: 5,
    Mouse: 6,
    MouseMat: 7,
    Headset: 8,
    HeadsetStand: 9,
    Gamepad: 10,
    Unknown: 11
);
