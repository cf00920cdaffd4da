use thiserror::Error;

/// Type alias for `Result<T, OpenRgbError>`
pub type OpenRgbResult<T> = std::result::Result<T, OpenRgbError>;

/// Errors returned by the [OpenRGB client](crate::OpenRgbClient).
///
/// Every variant except [`OpenRgbError::NotConnected`] and
/// [`OpenRgbError::AlreadyConnected`] is fatal to the connection: the client
/// drops the transport and further calls fail with `NotConnected` until the
/// handle is reconnected.
#[derive(Error, Debug)]
pub enum OpenRgbError {
    /// Failed opening connection to OpenRGB server.
    #[error("Failed opening connection to OpenRGB server at {addr}")]
    ConnectionError {
        /// OpenRGB server address.
        addr: String,

        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// Message ended in the middle of a field.
    #[error("Truncated message: needed {needed} more bytes, {available} available")]
    Truncated {
        /// Bytes the current field still required.
        needed: usize,

        /// Bytes left in the buffer.
        available: usize,
    },

    /// Invalid data encountered while communicating with OpenRGB server.
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// Frame did not start with the `ORGB` magic value.
    #[error("Expected OpenRGB magic value, got {0:?}")]
    BadMagic([u8; 4]),

    /// Header carried a packet ID outside the recognised set.
    #[error("Unknown packet ID {0}")]
    UnknownPacketId(u32),

    /// Declared body size exceeds the configured cap.
    #[error("Declared body size {size} exceeds the {cap} byte limit")]
    OverSized {
        /// Body size declared by the header.
        size: usize,

        /// Configured cap.
        cap: usize,
    },

    /// Reply packet matched no pending request and is not a notification.
    #[error("Received packet ID {0} with no matching request")]
    UnexpectedMessage(u32),

    /// Transport closed or reset.
    #[error("Connection to OpenRGB server lost")]
    Disconnected {
        /// Source error, absent on a clean close.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Deadline fired mid-operation.
    #[error("{operation} timed out")]
    Timeout {
        /// Operation that was cut short.
        operation: &'static str,
    },

    /// API call on a handle that is not connected.
    #[error("Client is not connected")]
    NotConnected,

    /// Connect on a handle that already has a live connection.
    #[error("Client is already connected")]
    AlreadyConnected,
}

impl OpenRgbError {
    /// Whether this error broke the connection.
    ///
    /// Non-fatal errors leave the handle usable; fatal ones require a
    /// reconnect.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            OpenRgbError::NotConnected | OpenRgbError::AlreadyConnected
        )
    }
}
