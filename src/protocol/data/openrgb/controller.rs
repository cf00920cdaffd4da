use crate::protocol::data::{Color, DeviceType, Led, ModeData, ZoneData};
use crate::protocol::{DeserFromBuf, ReceivedMessage, SerToBuf, WriteMessage};
use crate::{OpenRgbError, OpenRgbResult};

/// RGB controller.
///
/// Received as the reply to a controller data request, immutable once
/// materialised; a fresh request replaces the whole record.
///
/// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation#net_packet_id_request_controller_data) for more information.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ControllerData {
    /// Controller type.
    device_type: DeviceType,

    /// Controller name.
    name: String,

    /// Controller vendor.
    vendor: String,

    /// Controller description.
    description: String,

    /// Controller version.
    version: String,

    /// Controller serial.
    serial: String,

    /// Controller location.
    location: String,

    /// Controller active mode index, always within `modes`.
    active_mode: u32,

    /// Controller modes.
    modes: Vec<ModeData>,

    /// Controller zones.
    zones: Vec<ZoneData>,

    /// Controller LEDs.
    leds: Vec<Led>,

    /// Controller colors, one per LED.
    colors: Vec<Color>,

    /* NOT IN PROTOCOL, BUT USEFUL */
    /// Id of this controller, which is the id used to make the request.
    id: u32,

    /// Number of LEDs in this controller.
    ///
    /// Computed by adding up the zone's lengths.
    num_leds: usize,
}

impl ControllerData {
    /// Returns the name of this controller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ID of this controller.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    /// Returns the type of this controller.
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Returns the vendor of this controller.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Returns a description for this controller.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the version of this controller.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the serial number of this controller.
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Returns the location of this controller.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the mode of this controller that is currently active.
    pub fn active_mode(&self) -> &ModeData {
        // deserialization rejects records with active_mode out of range
        &self.modes[self.active_mode as usize]
    }

    /// Returns the modes this controller has.
    pub fn modes(&self) -> &[ModeData] {
        &self.modes
    }

    /// Returns the zones of this controller.
    pub fn zones(&self) -> &[ZoneData] {
        &self.zones
    }

    /// Returns the LEDs of this controller.
    pub fn leds(&self) -> &[Led] {
        &self.leds
    }

    /// The number of LEDs in all zones of this controller summed together.
    ///
    /// This is not necessarily the same as [`Self::leds()`]'s length.
    pub fn num_leds(&self) -> usize {
        self.num_leds
    }

    /// Returns the current colors of this controller, one per LED.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl DeserFromBuf for ControllerData {
    fn deserialize(buf: &mut ReceivedMessage<'_>) -> OpenRgbResult<Self> {
        let device_type = buf.read_value()?;
        let name = buf.read_value()?;
        let vendor = buf.read_value()?;
        let description = buf.read_value()?;
        let version = buf.read_value()?;
        let serial = buf.read_value()?;
        let location = buf.read_value()?;
        let num_modes = buf.read_u16()?;
        let active_mode = buf.read_u32()?;

        let mut modes = buf.read_n_values::<ModeData>(num_modes as usize)?;
        for (idx, mode) in modes.iter_mut().enumerate() {
            mode.set_id(idx);
        }
        if active_mode as usize >= modes.len() {
            return Err(OpenRgbError::Malformed(format!(
                "Active mode {active_mode} out of range for {} modes",
                modes.len()
            )));
        }

        let mut zones = buf.read_value::<Vec<ZoneData>>()?;
        let mut num_leds = 0;
        for (idx, zone) in zones.iter_mut().enumerate() {
            zone.id = idx;
            num_leds += zone.leds_count();
        }

        let leds = buf.read_value::<Vec<Led>>()?;
        let colors = buf.read_value::<Vec<Color>>()?;
        if colors.len() != leds.len() {
            return Err(OpenRgbError::Malformed(format!(
                "Controller has {} colors for {} LEDs",
                colors.len(),
                leds.len()
            )));
        }

        Ok(Self {
            device_type,
            name,
            vendor,
            description,
            version,
            serial,
            location,
            active_mode,
            modes,
            zones,
            leds,
            colors,
            id: u32::MAX,
            num_leds,
        })
    }
}

impl SerToBuf for ControllerData {
    fn wire_size(&self) -> usize {
        self.device_type.wire_size()
            + self.name.wire_size()
            + self.vendor.wire_size()
            + self.description.wire_size()
            + self.version.wire_size()
            + self.serial.wire_size()
            + self.location.wire_size()
            + size_of::<u16>() // mode count
            + size_of::<u32>() // active mode
            + self.modes.iter().map(SerToBuf::wire_size).sum::<usize>()
            + self.zones.wire_size()
            + self.leds.wire_size()
            + self.colors.wire_size()
    }

    fn serialize(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        buf.push_value(&self.device_type)?
            .push_value(&self.name)?
            .push_value(&self.vendor)?
            .push_value(&self.description)?
            .push_value(&self.version)?
            .push_value(&self.serial)?
            .push_value(&self.location)?;
        buf.write_u16(self.modes.len() as u16);
        buf.write_u32(self.active_mode);
        for mode in &self.modes {
            buf.write_value(mode)?;
        }
        buf.push_value(&self.zones)?
            .push_value(&self.leds)?
            .push_value(&self.colors)?;
        Ok(())
    }
}
