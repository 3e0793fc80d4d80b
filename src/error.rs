//! Error type shared by the OLED and e-paper drivers.

use core::fmt;

pub use display_interface::DisplayError;

use crate::display::profile::Model;

/// Everything that can go wrong while talking to a display.
///
/// Drawing outside the framebuffer is deliberately not represented here: those calls are clipped
/// silently.
#[derive(Clone, Debug)]
pub enum Error {
    /// A bus or GPIO device could not be opened or configured. The string names the resource.
    Open(&'static str),
    /// The requested display model has no device profile for the selected bus.
    UnsupportedGeometry(Model),
    /// A byte transfer or a control line change failed. The operation in progress is abandoned.
    Interface(DisplayError),
    /// The e-paper busy line could not be sampled.
    BusyPin,
    /// The e-paper busy line stayed asserted longer than the configured timeout.
    BusyTimeout,
    /// A command argument was outside the range the controller accepts.
    InvalidParameter,
    /// The driver is not in a state where the operation is allowed.
    InvalidState,
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Interface(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open(what) => write!(f, "failed to open {}", what),
            Error::UnsupportedGeometry(model) => write!(f, "display model {:?} not supported", model),
            Error::Interface(e) => write!(f, "display interface error: {:?}", e),
            Error::BusyPin => f.write_str("failed to read busy pin"),
            Error::BusyTimeout => f.write_str("timed out waiting for busy pin"),
            Error::InvalidParameter => f.write_str("command parameter out of range"),
            Error::InvalidState => f.write_str("operation not allowed in current state"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
