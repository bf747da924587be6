//! USB composite device - HID keyboard + CDC-ACM serial.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral.  Bus state (configured / suspended / remote wakeup
//! allowed) is mirrored into atomics by a [`embassy_usb::Handler`] so the
//! main loop can read it without awaiting.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::usb::{KeyboardWriter, UsbDriver};
use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_usb::class::cdc_acm::{self, CdcAcmClass};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use pwkey::config;
use pwkey::hid::keyboard::{KEYBOARD_REPORT_DESCRIPTOR, KEYBOARD_REPORT_SIZE};
use pwkey::hid::{HidHost, KeyboardReport};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

static KB_STATE: StaticCell<State> = StaticCell::new();
static CDC_STATE: StaticCell<cdc_acm::State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_STATE_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

static CONFIGURED: AtomicBool = AtomicBool::new(false);
static SUSPENDED: AtomicBool = AtomicBool::new(false);
static REMOTE_WAKEUP_ENABLED: AtomicBool = AtomicBool::new(false);
static REPORT_IN_FLIGHT: AtomicBool = AtomicBool::new(false);
static REMOTE_WAKEUP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// One report at a time: the channel being empty means the host drained
/// the previous one.
static REPORT_CHANNEL: Channel<CriticalSectionRawMutex, KeyboardReport, 1> = Channel::new();

struct UsbStateHandler;

impl embassy_usb::Handler for UsbStateHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            CONFIGURED.store(false, Ordering::Relaxed);
            SUSPENDED.store(false, Ordering::Relaxed);
        }
    }

    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        info!("USB configured={}", configured);
    }

    fn suspended(&mut self, suspended: bool) {
        SUSPENDED.store(suspended, Ordering::Relaxed);
        info!("USB suspended={}", suspended);
    }

    fn remote_wakeup_enabled(&mut self, enabled: bool) {
        REMOTE_WAKEUP_ENABLED.store(enabled, Ordering::Relaxed);
    }
}

/// Build result containing the USB device runner and the class handles.
pub struct UsbParts {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: KeyboardWriter,
    pub serial: CdcAcmClass<'static, UsbDriver>,
}

/// Initialise the USB stack and create the composite device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbParts {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;
    usb_config.supports_remote_wakeup = true;

    // CDC needs an interface association descriptor next to the HID.
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    // Build the USB device.
    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let handler = USB_STATE_HANDLER.init(UsbStateHandler);
    builder.handler(handler);

    let kb_state = KB_STATE.init(State::new());
    let kb_config = HidConfig {
        report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let keyboard_writer = HidWriter::new(&mut builder, kb_state, kb_config);

    let cdc_state = CDC_STATE.init(cdc_acm::State::new());
    let serial = CdcAcmClass::new(&mut builder, cdc_state, config::USB_CDC_PACKET_SIZE);

    let device = builder.build();

    info!("USB composite device initialised (keyboard + serial)");

    UsbParts {
        device,
        keyboard_writer,
        serial,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// Handles enumeration and endpoint servicing; while suspended it waits
/// for either a host resume or a remote-wakeup request from the typer.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    loop {
        device.run_until_suspend().await;
        match select(device.wait_resume(), REMOTE_WAKEUP.wait()).await {
            Either::First(_) => {}
            Either::Second(_) => {
                if let Err(e) = device.remote_wakeup().await {
                    warn!("Remote wakeup failed: {:?}", defmt::Debug2Format(&e));
                }
            }
        }
    }
}

/// HID report task - drains the report channel into the keyboard endpoint.
pub async fn hid_writer_task(mut keyboard: KeyboardWriter) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; KEYBOARD_REPORT_SIZE];

    loop {
        let report = REPORT_CHANNEL.receive().await;
        REPORT_IN_FLIGHT.store(true, Ordering::Relaxed);

        let n = report.serialize(&mut buf);
        if let Err(_e) = keyboard.write(&buf[..n]).await {
            warn!("USB keyboard write failed");
        }

        REPORT_IN_FLIGHT.store(false, Ordering::Relaxed);
    }
}

/// [`HidHost`] over the USB tasks above.
pub struct UsbKeyboard;

impl HidHost for UsbKeyboard {
    async fn poll(&mut self) {
        yield_now().await;
    }

    fn is_ready(&self) -> bool {
        CONFIGURED.load(Ordering::Relaxed)
            && !SUSPENDED.load(Ordering::Relaxed)
            && !REPORT_IN_FLIGHT.load(Ordering::Relaxed)
            && REPORT_CHANNEL.is_empty()
    }

    fn is_suspended(&self) -> bool {
        SUSPENDED.load(Ordering::Relaxed)
    }

    fn remote_wakeup(&mut self) -> bool {
        if !REMOTE_WAKEUP_ENABLED.load(Ordering::Relaxed) {
            return false;
        }
        REMOTE_WAKEUP.signal(());
        true
    }

    fn send_report(&mut self, report: &KeyboardReport) -> bool {
        REPORT_CHANNEL.try_send(*report).is_ok()
    }
}
