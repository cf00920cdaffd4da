//! Wire protocol layer: byte codecs, the 16-byte frame header, the typed
//! message set, the framed transport, and the connection state machine.

use std::net::Ipv4Addr;

pub mod data;

mod connection;
mod deserialize;
mod header;
mod message;
mod packet;
mod serialize;
mod stream;

pub use connection::Notification;
pub(crate) use connection::{Connection, ConnectionState};
pub(crate) use deserialize::*;
pub(crate) use header::*;
pub(crate) use message::*;
pub(crate) use packet::*;
pub(crate) use serialize::*;
pub(crate) use stream::*;

/// Protocol version implemented by this client.
///
/// The version used on a connection is the lower of this and the server's
/// version, settled once during the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// Default address used by [`crate::OpenRgbClient::connect`].
pub const DEFAULT_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::LOCALHOST, 6742);

/// Device ID to use when no specific device is targeted.
pub(crate) const NO_DEVICE_ID: u32 = 0;
