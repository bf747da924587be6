//! pwkey firmware entry point.
//!
//! Brings up the USB composite device (keyboard + CDC serial), the OLED
//! and the action button, then hands everything to the library's
//! [`Orchestrator`] which runs the trigger / playback loop forever.
//!
//! ## Task layout
//!
//! | Task            | Role                                           |
//! |-----------------|------------------------------------------------|
//! | `usb_task`      | Enumeration, suspend/resume, remote wakeup     |
//! | `hid_task`      | Drains keyboard reports into the IN endpoint   |
//! | `cdc_rx_task`   | Host → device serial bytes                     |
//! | `cdc_tx_task`   | Device → host serial bytes                     |
//! | `main`          | Orchestrator loop                              |

#![no_std]
#![no_main]

mod board;
mod ui;
mod usb;

use defmt::info;
use embassy_executor::Spawner;
use embassy_nrf::config::HfclkSource;
use embassy_nrf::gpio::Pin;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use pwkey::io::NoCardReader;
use pwkey::{DeviceConfig, Orchestrator};
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

#[embassy_executor::task]
async fn usb_task(device: embassy_usb::UsbDevice<'static, usb::UsbDriver>) -> ! {
    usb::hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_task(writer: usb::KeyboardWriter) -> ! {
    usb::hid_device::hid_writer_task(writer).await
}

#[embassy_executor::task]
async fn cdc_rx_task(rx: usb::CdcReceiver) -> ! {
    usb::serial::cdc_rx_task(rx).await
}

#[embassy_executor::task]
async fn cdc_tx_task(tx: usb::CdcSender) -> ! {
    usb::serial::cdc_tx_task(tx).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("pwkey starting");

    // USB needs the crystal oscillator.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    let parts = usb::hid_device::init(p.USBD);
    let (cdc_tx, cdc_rx) = parts.serial.split();

    spawner.must_spawn(usb_task(parts.device));
    spawner.must_spawn(hid_task(parts.keyboard_writer));
    spawner.must_spawn(cdc_rx_task(cdc_rx));
    spawner.must_spawn(cdc_tx_task(cdc_tx));

    let mut i2c_config = twim::Config::default();
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, i2c_config);
    let display = ui::display::OledStatus::new(i2c);

    let button = ui::buttons::PushButton::new(p.P0_11.degrade());

    // No proximity module on this board: button triggers only, and the
    // short click types, so slot 1 is unreachable. `card_reader()` plus
    // a `CardReader` driver switches the short click to slot toggling.
    let mut device = Orchestrator::new(
        DeviceConfig::default(),
        usb::hid_device::UsbKeyboard,
        usb::serial::UsbSerial,
        button,
        NoCardReader,
        board::EmbassyClock,
        display,
    );

    info!("Entering main loop");
    device.run().await
}
