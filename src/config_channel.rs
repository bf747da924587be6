//! Serial configuration channel.
//!
//! Line-oriented access to the CDC serial port, used by service mode to
//! replace the stored credential.  Reads end at CR or LF, or when the
//! idle timeout elapses with nothing received.  Nothing here ever blocks
//! past the service window, and a disconnected port turns every operation
//! into a logged no-op.

use crate::config::{
    LineMode, ServiceConfig, MAX_CREDENTIAL_LEN, SERIAL_POLL_INTERVAL_MS, SERVICE_PROMPT,
};
use crate::credential::CredentialStore;
use crate::error::{Error, Result};
use crate::io::Clock;
use heapless::Vec;

/// Payload plus room for an echoed `"\n\r"`.
pub const LINE_CAPACITY: usize = MAX_CREDENTIAL_LEN + 2;

/// One received line.
pub type Line = Vec<u8, LINE_CAPACITY>;

/// Poll interval while waiting for a host terminal to connect (ms).
const RECONNECT_POLL_MS: u64 = 10;

/// The serial collaborator (USB CDC-ACM on the target).
#[allow(async_fn_in_trait)]
pub trait SerialPort {
    /// Run the device stack's cooperative task function once.
    async fn poll(&mut self);

    /// `true` while a terminal holds the port open.
    fn is_connected(&self) -> bool;

    /// Next received byte, if any. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue as much of `data` as fits. Returns the bytes accepted.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Push queued bytes towards the host.
    fn flush(&mut self) {}
}

/// Line reader/writer bound to the service-mode settings.
#[derive(Clone, Copy, Debug)]
pub struct ConfigChannel {
    config: ServiceConfig,
}

impl ConfigChannel {
    pub const fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Read one line into `line`. Returns its length (0 on timeout or
    /// when the port is not connected).
    ///
    /// Same as [`read_line_until`](Self::read_line_until) with the
    /// service window as the deadline.
    pub async fn read_line<S, C>(&self, serial: &mut S, clock: &C, line: &mut Line) -> usize
    where
        S: SerialPort,
        C: Clock,
    {
        let deadline_ms = clock.now_ms() + self.config.window_ms;
        self.read_line_until(serial, clock, line, deadline_ms).await
    }

    /// Read one line, giving up at `deadline_ms`.
    ///
    /// The idle timeout only applies while nothing has been received:
    /// once a payload byte arrives the read continues until a terminator,
    /// a disconnect or the deadline.  A line cut short by a disconnect or
    /// the deadline is discarded unless it already filled the payload
    /// capacity.  Terminators seen before any payload byte are skipped, so
    /// a CR LF pair produces one line.  Bytes past the payload capacity
    /// are discarded up to the next terminator.
    pub async fn read_line_until<S, C>(
        &self,
        serial: &mut S,
        clock: &C,
        line: &mut Line,
        deadline_ms: u64,
    ) -> usize
    where
        S: SerialPort,
        C: Clock,
    {
        line.clear();
        if !serial.is_connected() {
            error!("Serial read skipped: not connected");
            return 0;
        }

        let mut last_byte_ms = clock.now_ms();
        let mut dropped = 0usize;
        let mut terminated = false;
        loop {
            match serial.read_byte() {
                Some(b'\r' | b'\n') => {
                    last_byte_ms = clock.now_ms();
                    if line.is_empty() && dropped == 0 {
                        continue;
                    }
                    terminated = true;
                    break;
                }
                Some(byte) => {
                    last_byte_ms = clock.now_ms();
                    if line.len() < MAX_CREDENTIAL_LEN {
                        let _ = line.push(byte);
                    } else {
                        dropped += 1;
                    }
                }
                None => {
                    let nothing_yet = line.is_empty() && dropped == 0;
                    if nothing_yet && clock.elapsed_since(last_byte_ms) >= self.config.idle_timeout_ms {
                        break;
                    }
                    if !serial.is_connected() || clock.now_ms() >= deadline_ms {
                        break;
                    }
                    serial.poll().await;
                    clock.delay_ms(SERIAL_POLL_INTERVAL_MS).await;
                }
            }
        }

        if dropped > 0 {
            warn!("Serial line too long: {} bytes dropped", dropped);
        }
        if !terminated && !line.is_empty() && line.len() < MAX_CREDENTIAL_LEN {
            warn!("Serial line incomplete: {} bytes discarded", line.len());
            line.clear();
        }
        if !line.is_empty() {
            debug!("Serial line read: {} bytes", line.len());
            if self.config.line_mode == LineMode::Echo {
                let _ = line.extend_from_slice(b"\n\r");
            }
        }
        line.len()
    }

    /// Write `text` if a terminal is connected and the port drains
    /// within the timeout.
    pub async fn write_line<S, C>(&self, serial: &mut S, clock: &C, text: &[u8]) -> Result<()>
    where
        S: SerialPort,
        C: Clock,
    {
        if !serial.is_connected() {
            error!("Serial write skipped: not connected");
            return Err(Error::SerialDisconnected);
        }

        let start = clock.now_ms();
        let mut rest = text;
        loop {
            let written = serial.write(rest);
            rest = &rest[written..];
            if rest.is_empty() {
                break;
            }
            if !serial.is_connected() {
                error!("Serial disconnected during write");
                return Err(Error::SerialDisconnected);
            }
            if clock.elapsed_since(start) >= self.config.idle_timeout_ms {
                warn!("Serial write timed out, {} bytes unsent", rest.len());
                return Err(Error::Timeout);
            }
            serial.poll().await;
            clock.delay_ms(SERIAL_POLL_INTERVAL_MS).await;
        }

        serial.flush();
        serial.poll().await;
        Ok(())
    }

    /// Service mode: prompt for a new credential and store the first
    /// non-empty line in slot 0.  Returns the stored length, or `None`
    /// if the service window closed without input.
    pub async fn reconfigure<S, C>(
        &self,
        serial: &mut S,
        clock: &C,
        store: &mut CredentialStore,
    ) -> Option<usize>
    where
        S: SerialPort,
        C: Clock,
    {
        info!("Service mode: waiting up to {} ms", self.config.window_ms);
        let deadline_ms = clock.now_ms() + self.config.window_ms;
        let mut prompted = false;
        let mut line = Line::new();

        while clock.now_ms() < deadline_ms {
            if !serial.is_connected() {
                serial.poll().await;
                clock.delay_ms(RECONNECT_POLL_MS).await;
                continue;
            }
            if !prompted {
                if let Err(e) = self.write_line(serial, clock, SERVICE_PROMPT.as_bytes()).await {
                    warn!("Prompt not shown: {}", e);
                }
                prompted = true;
            }

            if self.read_line_until(serial, clock, &mut line, deadline_ms).await == 0 {
                continue;
            }
            let secret = strip_terminators(&line);
            if secret.is_empty() {
                continue;
            }
            if self.config.line_mode == LineMode::Echo {
                if let Err(e) = self.write_line(serial, clock, &line).await {
                    warn!("Echo failed: {}", e);
                }
            }
            return Some(store.replace(secret));
        }

        info!("Service mode: window closed without input");
        None
    }
}

impl Default for ConfigChannel {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

/// Payload of a line without trailing CR/LF bytes.
pub fn strip_terminators(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |idx| idx + 1);
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::strip_terminators;

    #[test]
    fn strip_terminators_removes_trailing_line_endings_only() {
        assert_eq!(strip_terminators(b"abc\n\r"), b"abc");
        assert_eq!(strip_terminators(b"abc\r\n"), b"abc");
        assert_eq!(strip_terminators(b"a\rb"), b"a\rb");
        assert_eq!(strip_terminators(b"\r\n"), b"");
        assert_eq!(strip_terminators(b""), b"");
    }
}
