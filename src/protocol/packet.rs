/// OpenRGB protocol packet ID.
///
/// A request and its reply share the same ID; direction tells them apart.
/// The client decides what an inbound frame of a given ID means from what it
/// has sent.
///
/// See [Open SDK documentation](https://gitlab.com/CalcProgrammer1/OpenRGB/-/wikis/OpenRGB-SDK-Documentation#packet-ids) for more information.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub(crate) enum PacketId {
    /// Request RGBController device count from server.
    RequestControllerCount = 0,

    /// Request RGBController data block.
    RequestControllerData = 1,

    /// Request OpenRGB SDK protocol version from server.
    RequestProtocolVersion = 40,

    /// Send client name string to server.
    SetClientName = 50,

    /// Indicate to clients that device list has updated.
    DeviceListUpdated = 100,

    /// RGBController::ResizeZone().
    RGBControllerResizeZone = 1000,

    /// RGBController::UpdateLEDs().
    RGBControllerUpdateLeds = 1050,

    /// RGBController::UpdateZoneLEDs().
    RGBControllerUpdateZoneLeds = 1051,

    /// RGBController::UpdateSingleLED().
    RGBControllerUpdateSingleLed = 1052,

    /// RGBController::SetCustomMode().
    RGBControllerSetCustomMode = 1100,

    /// RGBController::UpdateMode().
    RGBControllerUpdateMode = 1101,
}

impl PacketId {
    /// Maps a wire code to a packet ID. `None` for codes outside the
    /// recognised set; the header codec turns that into `UnknownPacketId`.
    pub fn from_code(code: u32) -> Option<Self> {
        let id = match code {
            0 => PacketId::RequestControllerCount,
            1 => PacketId::RequestControllerData,
            40 => PacketId::RequestProtocolVersion,
            50 => PacketId::SetClientName,
            100 => PacketId::DeviceListUpdated,
            1000 => PacketId::RGBControllerResizeZone,
            1050 => PacketId::RGBControllerUpdateLeds,
            1051 => PacketId::RGBControllerUpdateZoneLeds,
            1052 => PacketId::RGBControllerUpdateSingleLed,
            1100 => PacketId::RGBControllerSetCustomMode,
            1101 => PacketId::RGBControllerUpdateMode,
            _ => return None,
        };
        Some(id)
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Whether a request of this ID gets a reply frame.
    pub fn expects_reply(self) -> bool {
        matches!(
            self,
            PacketId::RequestControllerCount
                | PacketId::RequestControllerData
                | PacketId::RequestProtocolVersion
        )
    }

    /// Whether the server sends this ID on its own initiative.
    pub fn is_notification(self) -> bool {
        matches!(self, PacketId::DeviceListUpdated)
    }
}
