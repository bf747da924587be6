//! CDC-ACM serial pumps and the [`SerialPort`] the main loop reads.
//!
//! Two tasks move bytes between the bulk endpoints and a pair of pipes;
//! the main loop only ever touches the pipes, so its reads and writes
//! never block.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::usb::{CdcReceiver, CdcSender};
use defmt::{info, warn};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use pwkey::config::USB_CDC_PACKET_SIZE;
use pwkey::config_channel::SerialPort;

const PACKET: usize = USB_CDC_PACKET_SIZE as usize;

static RX_PIPE: Pipe<CriticalSectionRawMutex, 128> = Pipe::new();
static TX_PIPE: Pipe<CriticalSectionRawMutex, 128> = Pipe::new();
static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Host → device: copy received packets into the rx pipe.
pub async fn cdc_rx_task(mut rx: CdcReceiver) -> ! {
    let mut buf = [0u8; PACKET];
    loop {
        rx.wait_connection().await;
        CONNECTED.store(true, Ordering::Relaxed);
        info!("CDC connected");

        while let Ok(n) = rx.read_packet(&mut buf).await {
            match RX_PIPE.try_write(&buf[..n]) {
                Ok(written) if written == n => {}
                _ => warn!("CDC rx pipe full - dropping input"),
            }
        }

        CONNECTED.store(false, Ordering::Relaxed);
        RX_PIPE.clear();
        info!("CDC disconnected");
    }
}

/// Device → host: forward the tx pipe in bulk packets.
pub async fn cdc_tx_task(mut tx: CdcSender) -> ! {
    let mut buf = [0u8; PACKET];
    loop {
        tx.wait_connection().await;
        loop {
            let n = TX_PIPE.read(&mut buf).await;
            if tx.write_packet(&buf[..n]).await.is_err() {
                break;
            }
            // A full packet must be followed by a ZLP to end the transfer.
            if n == PACKET && tx.write_packet(&[]).await.is_err() {
                break;
            }
        }
        TX_PIPE.clear();
    }
}

/// [`SerialPort`] over the pipes above.
pub struct UsbSerial;

impl SerialPort for UsbSerial {
    async fn poll(&mut self) {
        yield_now().await;
    }

    fn is_connected(&self) -> bool {
        CONNECTED.load(Ordering::Relaxed)
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match RX_PIPE.try_read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write(&mut self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        TX_PIPE.try_write(data).unwrap_or(0)
    }
}
