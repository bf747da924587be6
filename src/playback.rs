//! Playback engine - types a credential as timed HID reports.
//!
//! Every character becomes a key-down report followed by an all-zero
//! key-up report, each followed by a fixed dwell.  Before each report the
//! engine waits for the host to accept one, servicing the device stack
//! while it waits.  Playback is synchronous: nothing else runs on the
//! main loop until it completes or aborts, so two credentials can never
//! interleave.  An abort is final; nothing is retried automatically.

use crate::config::{HostWait, PlaybackConfig, HOST_POLL_INTERVAL_MS};
use crate::error::{HostFault, Result};
use crate::hid::{HidHost, KeyboardReport};
use crate::io::Clock;
use crate::keymap;

/// Summary of a finished playback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Completed {
    /// Characters sent as a press/release pair.
    pub typed: usize,
    /// Unmapped characters that were skipped.
    pub skipped: usize,
}

impl Completed {
    /// Number of reports emitted.
    pub fn reports(&self) -> usize {
        self.typed * 2
    }
}

/// Type `credential` (up to its first NUL) on the host.
pub async fn play<H, C>(
    host: &mut H,
    clock: &C,
    credential: &[u8],
    config: &PlaybackConfig,
) -> Result<Completed>
where
    H: HidHost,
    C: Clock,
{
    wake_host(host)?;

    let mut done = Completed::default();
    for &ch in credential.iter().take_while(|&&b| b != 0) {
        let stroke = keymap::map(ch);
        if stroke.is_sentinel() && config.skip_unmapped {
            done.skipped += 1;
            continue;
        }

        send(host, clock, &KeyboardReport::key_down(stroke), config.host_wait).await?;
        clock.delay_ms(config.dwell_ms).await;
        send(host, clock, &KeyboardReport::empty(), config.host_wait).await?;
        clock.delay_ms(config.dwell_ms).await;

        done.typed += 1;
        trace!("Playback: character {} sent", done.typed);
    }

    if done.skipped > 0 {
        warn!("Playback: {} unmapped characters skipped", done.skipped);
    }
    info!("Playback complete: {} characters", done.typed);
    Ok(done)
}

/// Send one all-zero report so the host sees every key released.
pub async fn send_idle_report<H, C>(host: &mut H, clock: &C, config: &PlaybackConfig) -> Result<()>
where
    H: HidHost,
    C: Clock,
{
    wake_host(host)?;
    send(host, clock, &KeyboardReport::empty(), config.host_wait).await?;
    clock.delay_ms(config.idle_dwell_ms).await;
    Ok(())
}

/// Request remote wakeup if the bus is suspended.
fn wake_host<H: HidHost>(host: &mut H) -> Result<()> {
    if !host.is_suspended() {
        return Ok(());
    }
    if host.remote_wakeup() {
        info!("Remote wakeup requested");
        Ok(())
    } else {
        warn!("Remote wakeup refused, aborting");
        Err(HostFault::WakeRefused.into())
    }
}

async fn send<H, C>(host: &mut H, clock: &C, report: &KeyboardReport, wait: HostWait) -> Result<()>
where
    H: HidHost,
    C: Clock,
{
    wait_ready(host, clock, wait).await?;
    if host.send_report(report) {
        Ok(())
    } else {
        warn!("HID report rejected by device stack");
        Err(HostFault::Rejected.into())
    }
}

/// Poll the device stack until the host accepts a report.
pub async fn wait_ready<H, C>(host: &mut H, clock: &C, wait: HostWait) -> Result<()>
where
    H: HidHost,
    C: Clock,
{
    let start = clock.now_ms();
    loop {
        if host.is_ready() {
            return Ok(());
        }
        if let HostWait::Bounded(limit) = wait {
            if clock.elapsed_since(start) >= limit {
                error!("HID not ready after {} ms, aborting", limit);
                return Err(HostFault::NotReady.into());
            }
        }
        host.poll().await;
        clock.delay_ms(HOST_POLL_INTERVAL_MS).await;
    }
}
