//! USB Device subsystem - presents a composite device to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`.  We create a **composite device** with:
//!
//! - Interface 0:   Keyboard (boot protocol report layout)
//! - Interface 1/2: CDC-ACM serial (credential reconfiguration)
//!
//! Each class is serviced by its own Embassy task; the main loop talks to
//! them through [`hid_device::UsbKeyboard`] and [`serial::UsbSerial`].

pub mod hid_device;
pub mod serial;

use embassy_nrf::peripherals;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_usb::class::cdc_acm;
use embassy_usb::class::hid::HidWriter;

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
pub type KeyboardWriter = HidWriter<'static, UsbDriver, 8>;
pub type CdcSender = cdc_acm::Sender<'static, UsbDriver>;
pub type CdcReceiver = cdc_acm::Receiver<'static, UsbDriver>;
