use crate::protocol::data::{Color, ControllerData, DeviceType, Led, ModeData, ZoneData};
use crate::{OpenRgbClient, OpenRgbResult};

/// An RGBController: one RGB device exposed by the server, paired with the
/// client it came from.
///
/// The description is a snapshot from fetch time; [`Self::refresh`] replaces
/// it wholesale. Update calls add nothing over [`OpenRgbClient`]'s, they just
/// fill in the controller ID.
pub struct Controller {
    client: OpenRgbClient,
    data: ControllerData,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("num_leds", &self.num_leds())
            .field("modes", &self.modes().len())
            .finish()
    }
}

impl Controller {
    pub(crate) fn new(client: OpenRgbClient, data: ControllerData) -> Self {
        Self { client, data }
    }

    /// Returns the ID of this controller.
    pub fn id(&self) -> u32 {
        self.data.id()
    }

    delegate::delegate! {
        to self.data {
            /// Returns the name of this controller.
            pub fn name(&self) -> &str;
            /// Returns the type of this controller.
            pub fn device_type(&self) -> DeviceType;
            /// Returns the vendor of this controller.
            pub fn vendor(&self) -> &str;
            /// Returns a description for this controller.
            pub fn description(&self) -> &str;
            /// Returns the version of this controller.
            pub fn version(&self) -> &str;
            /// Returns the serial number of this controller.
            pub fn serial(&self) -> &str;
            /// Returns the location of this controller.
            pub fn location(&self) -> &str;
            /// Returns the colors of this controller as of the last fetch.
            pub fn colors(&self) -> &[Color];
            /// Returns the number of LEDs in this controller.
            pub fn num_leds(&self) -> usize;
            /// Returns the modes supported by this controller.
            pub fn modes(&self) -> &[ModeData];
            /// Returns the zones of this controller.
            pub fn zones(&self) -> &[ZoneData];
            /// Returns the LEDs in this controller.
            pub fn leds(&self) -> &[Led];
            /// Returns the currently active mode.
            pub fn active_mode(&self) -> &ModeData;
        }
    }

    /// Returns the full description record.
    pub fn data(&self) -> &ControllerData {
        &self.data
    }

    /// Sets a single LED to the given `color`.
    pub async fn set_led<C: Into<Color>>(&self, led_id: u32, color: C) -> OpenRgbResult<()> {
        self.client.update_led(self.id(), led_id, color.into()).await
    }

    /// Sets the LEDs of this controller to the given `colors`.
    pub async fn set_leds(&self, colors: &[Color]) -> OpenRgbResult<()> {
        self.client.update_leds(self.id(), colors).await
    }

    /// Sets all LEDs of this controller to a given `color`.
    pub async fn set_all_leds<C: Into<Color>>(&self, color: C) -> OpenRgbResult<()> {
        let colors = vec![color.into(); self.num_leds()];
        self.client.update_leds(self.id(), &colors).await
    }

    /// Sets the LEDs of a specific zone to the given `colors`.
    pub async fn set_zone_leds(&self, zone_id: u32, colors: &[Color]) -> OpenRgbResult<()> {
        self.client.update_zone_leds(self.id(), zone_id, colors).await
    }

    /// Resizes one of this controller's zones.
    pub async fn resize_zone(&self, zone_id: u32, new_size: u32) -> OpenRgbResult<()> {
        self.client.resize_zone(self.id(), zone_id, new_size).await
    }

    /// Switches this controller to its custom mode.
    pub async fn set_custom_mode(&self) -> OpenRgbResult<()> {
        self.client.set_custom_mode(self.id()).await
    }

    /// Pushes `mode` to the controller, keyed by the mode's own index.
    pub async fn set_mode(&self, mode: &ModeData) -> OpenRgbResult<()> {
        self.client.update_mode(self.id(), mode.id() as u32, mode).await
    }

    /// Fetches the controller description again, replacing the snapshot.
    pub async fn refresh(&mut self) -> OpenRgbResult<()> {
        self.data = self.client.get_controller_data(self.id()).await?;
        Ok(())
    }
}
