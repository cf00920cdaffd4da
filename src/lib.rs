//! Client library for the [OpenRGB](https://gitlab.com/CalcProgrammer1/OpenRGB/-/blob/master/Documentation/OpenRGBSDK.md) SDK server network protocol.
//!
//! This client is async and requires a [tokio](https://tokio.rs) runtime to run.
//!
//! # Example
//!
//! ```no_run
//! use openrgb_net::{Color, OpenRgbClient, OpenRgbResult};
//!
//! #[tokio::main]
//! async fn main() -> OpenRgbResult<()> {
//!     // connect to default server at localhost
//!     let client = OpenRgbClient::connect().await?;
//!     for controller in client.get_all_controllers().await? {
//!         controller.set_all_leds(Color::new(255, 80, 0)).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`OpenRgbClient`] speaks the framed binary protocol to the server:
//! enumerate [`Controller`]s, read their modes, zones and LEDs, and drive
//! their colors. Replies are matched to requests in issue order (the wire
//! has no request IDs) and server pushes surface as [`Notification`]s via
//! [`OpenRgbClient::poll_notification`].

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

#[doc(inline)]
pub use {
    client::*,
    error::{OpenRgbError, OpenRgbResult},
    protocol::data::*,
    protocol::{DEFAULT_ADDR, Notification, PROTOCOL_VERSION},
};

mod client;
mod error;
pub(crate) mod protocol;
