use crate::protocol::data::{Color, ControllerData, ModeData};
use crate::protocol::{PacketId, ReceivedMessage, SerToBuf, WriteMessage};
use crate::{OpenRgbError, OpenRgbResult};

/// A protocol message: the typed body of one frame.
///
/// `packet_id` is the only dispatcher; requests and replies that share a code
/// are separate variants because they only ever travel in one direction.
/// Bodies that open with a 32-bit `data_size` mirror of the header's
/// `body_size` (`ReplyControllerData`, `UpdateLeds`, `UpdateZoneLeds`,
/// `UpdateMode`) get that word written and checked here; the mirror counts
/// itself, so `data_size == body_size` always.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Message {
    /// Ask how many controllers the server manages.
    RequestControllerCount,

    /// Controller count reply.
    ReplyControllerCount { count: u32 },

    /// Ask for one controller's full description.
    RequestControllerData { protocol_version: u32 },

    /// Controller description reply.
    ReplyControllerData { controller: ControllerData },

    /// Offer the client's protocol version.
    RequestProtocolVersion { client_version: u32 },

    /// Server's protocol version.
    ReplyProtocolVersion { server_version: u32 },

    /// Name this client in the server's client list.
    SetClientName { name: String },

    /// Server-initiated: the device list changed, refetch.
    DeviceListUpdated,

    /// Resize a resizable zone.
    ResizeZone { zone_id: u32, new_size: u32 },

    /// Set every LED of a controller.
    UpdateLeds { colors: Vec<Color> },

    /// Set every LED of one zone.
    UpdateZoneLeds { zone_id: u32, colors: Vec<Color> },

    /// Set one LED.
    UpdateSingleLed { led_id: u32, color: Color },

    /// Switch the controller to its custom mode.
    SetCustomMode,

    /// Push a mode description to the controller.
    UpdateMode { mode_id: u32, mode: ModeData },
}

impl Message {
    pub fn packet_id(&self) -> PacketId {
        match self {
            Message::RequestControllerCount | Message::ReplyControllerCount { .. } => {
                PacketId::RequestControllerCount
            }
            Message::RequestControllerData { .. } | Message::ReplyControllerData { .. } => {
                PacketId::RequestControllerData
            }
            Message::RequestProtocolVersion { .. } | Message::ReplyProtocolVersion { .. } => {
                PacketId::RequestProtocolVersion
            }
            Message::SetClientName { .. } => PacketId::SetClientName,
            Message::DeviceListUpdated => PacketId::DeviceListUpdated,
            Message::ResizeZone { .. } => PacketId::RGBControllerResizeZone,
            Message::UpdateLeds { .. } => PacketId::RGBControllerUpdateLeds,
            Message::UpdateZoneLeds { .. } => PacketId::RGBControllerUpdateZoneLeds,
            Message::UpdateSingleLed { .. } => PacketId::RGBControllerUpdateSingleLed,
            Message::SetCustomMode => PacketId::RGBControllerSetCustomMode,
            Message::UpdateMode { .. } => PacketId::RGBControllerUpdateMode,
        }
    }

    /// Exact body length in bytes, the `data_size` mirror word included.
    pub fn body_size(&self) -> usize {
        let data_size = size_of::<u32>();
        match self {
            Message::RequestControllerCount
            | Message::DeviceListUpdated
            | Message::SetCustomMode => 0,
            Message::ReplyControllerCount { count } => count.wire_size(),
            Message::RequestControllerData { protocol_version } => protocol_version.wire_size(),
            Message::ReplyControllerData { controller } => data_size + controller.wire_size(),
            Message::RequestProtocolVersion { client_version } => client_version.wire_size(),
            Message::ReplyProtocolVersion { server_version } => server_version.wire_size(),
            Message::SetClientName { name } => name.wire_size(),
            Message::ResizeZone { .. } => 2 * size_of::<u32>(),
            Message::UpdateLeds { colors } => data_size + colors.wire_size(),
            Message::UpdateZoneLeds { colors, .. } => {
                data_size + size_of::<u32>() + colors.wire_size()
            }
            Message::UpdateSingleLed { led_id, color } => led_id.wire_size() + color.wire_size(),
            Message::UpdateMode { mode, .. } => data_size + size_of::<u32>() + mode.wire_size(),
        }
    }

    /// Writes the body. The caller already wrote the header from
    /// [`Self::body_size`], so the mirror word equals it by construction.
    pub fn write_body(&self, buf: &mut WriteMessage) -> OpenRgbResult<()> {
        match self {
            Message::RequestControllerCount
            | Message::DeviceListUpdated
            | Message::SetCustomMode => Ok(()),
            Message::ReplyControllerCount { count } => buf.write_value(count),
            Message::RequestControllerData { protocol_version } => {
                buf.write_value(protocol_version)
            }
            Message::ReplyControllerData { controller } => {
                buf.write_u32(self.body_size() as u32);
                buf.write_value(controller)
            }
            Message::RequestProtocolVersion { client_version } => buf.write_value(client_version),
            Message::ReplyProtocolVersion { server_version } => buf.write_value(server_version),
            Message::SetClientName { name } => buf.write_value(name),
            Message::ResizeZone { zone_id, new_size } => {
                buf.write_u32(*zone_id);
                buf.write_u32(*new_size);
                Ok(())
            }
            Message::UpdateLeds { colors } => {
                buf.write_u32(self.body_size() as u32);
                buf.write_value(colors)
            }
            Message::UpdateZoneLeds { zone_id, colors } => {
                buf.write_u32(self.body_size() as u32);
                buf.write_u32(*zone_id);
                buf.write_value(colors)
            }
            Message::UpdateSingleLed { led_id, color } => {
                buf.write_u32(*led_id);
                buf.write_value(color)
            }
            Message::UpdateMode { mode_id, mode } => {
                buf.write_u32(self.body_size() as u32);
                buf.write_u32(*mode_id);
                buf.write_value(mode)
            }
        }
    }

    /// Decodes an inbound body by packet ID.
    ///
    /// Only reply and notification frames are ever decoded; the connection
    /// rejects other codes before reaching here.
    pub fn decode_inbound(
        packet_id: PacketId,
        msg: &mut ReceivedMessage<'_>,
    ) -> OpenRgbResult<Message> {
        match packet_id {
            PacketId::RequestControllerCount => Ok(Message::ReplyControllerCount {
                count: msg.read_u32()?,
            }),
            PacketId::RequestControllerData => {
                let data_size = msg.read_u32()? as usize;
                if data_size != msg.len() {
                    return Err(OpenRgbError::Malformed(format!(
                        "Controller data size {data_size} does not match body size {}",
                        msg.len()
                    )));
                }
                Ok(Message::ReplyControllerData {
                    controller: msg.read_value()?,
                })
            }
            PacketId::RequestProtocolVersion => Ok(Message::ReplyProtocolVersion {
                server_version: msg.read_u32()?,
            }),
            PacketId::DeviceListUpdated => {
                if msg.len() != 0 {
                    return Err(OpenRgbError::Malformed(format!(
                        "Device list notification carries a {} byte body",
                        msg.len()
                    )));
                }
                Ok(Message::DeviceListUpdated)
            }
            other => Err(OpenRgbError::UnexpectedMessage(other.code())),
        }
    }
}
