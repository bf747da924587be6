//! Unified error type for pwkey.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! None of these are fatal: every failure is logged where it happens and
//! the main loop keeps polling.

use core::fmt;

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // USB HID
    /// The host could not be reached; playback was aborted.
    HostUnreachable(HostFault),

    // Serial
    /// The configuration channel has no active connection.
    SerialDisconnected,

    // Generic
    /// Operation timed out.
    Timeout,
}

/// Why the host was unreachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostFault {
    /// The bus is suspended and the remote-wakeup request was refused.
    WakeRefused,
    /// The host did not become ready within the bounded wait.
    NotReady,
    /// The device stack refused to queue a report.
    Rejected,
}

impl From<HostFault> for Error {
    fn from(fault: HostFault) -> Self {
        Error::HostUnreachable(fault)
    }
}

impl fmt::Display for HostFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostFault::WakeRefused => f.write_str("remote wakeup refused"),
            HostFault::NotReady => f.write_str("host not ready"),
            HostFault::Rejected => f.write_str("report rejected"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::HostUnreachable(fault) => write!(f, "host unreachable: {}", fault),
            Error::SerialDisconnected => f.write_str("serial disconnected"),
            Error::Timeout => f.write_str("timeout"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
