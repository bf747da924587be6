//! pwkey - USB HID password key.
//!
//! The device enumerates as a keyboard plus a CDC serial port.  A button
//! click or an allow-listed proximity card makes it type the stored
//! credential into the host; a long click opens service mode, where a new
//! credential is read from the serial port.
//!
//! Everything in this library is hardware-independent and runs on the
//! host under `cargo test`.  The firmware binary (`main.rs`, feature
//! `embedded`) implements the collaborator traits over Embassy:
//!
//! - [`hid::HidHost`] - USB device stack / HID endpoint
//! - [`config_channel::SerialPort`] - CDC-ACM serial
//! - [`io::Clock`], [`io::ButtonInput`], [`io::CardReader`], [`io::StatusDisplay`]

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod config_channel;
pub mod credential;
pub mod device;
pub mod error;
pub mod hid;
pub mod io;
pub mod keymap;
pub mod playback;
pub mod trigger;

pub use config::DeviceConfig;
pub use credential::{CardId, Credential, CredentialStore};
pub use device::{DeviceState, Orchestrator, Outcome};
pub use error::{Error, HostFault};
pub use hid::KeyboardReport;
pub use keymap::KeyStroke;
pub use trigger::TriggerEvent;
