//! Action button click classification.
//!
//! The button is active-low with an internal pull-up; [`ButtonInput`]
//! already reports it as pressed/released.  Once a press is seen the
//! detector blocks, sampling every `sample_ms` while servicing the device
//! stack, until the press is classified:
//!
//! - released before the window elapses -> `ShortClick`
//! - still held when the window elapses -> `LongClick`
//!
//! The device does not react to anything else during the window.  After
//! a long click the detector waits for release (without blocking) so the
//! tail of the same press is not classified again.

use super::TriggerEvent;
use crate::hid::HidHost;
use crate::io::{ButtonInput, Clock};

#[derive(Debug)]
pub struct ButtonDetector {
    long_click_ms: u64,
    sample_ms: u64,
    awaiting_release: bool,
}

impl ButtonDetector {
    pub const fn new(long_click_ms: u64, sample_ms: u64) -> Self {
        Self {
            long_click_ms,
            sample_ms,
            awaiting_release: false,
        }
    }

    pub async fn poll<B, H, C>(&mut self, input: &mut B, host: &mut H, clock: &C) -> TriggerEvent
    where
        B: ButtonInput,
        H: HidHost,
        C: Clock,
    {
        if !input.is_pressed() {
            self.awaiting_release = false;
            return TriggerEvent::None;
        }
        if self.awaiting_release {
            return TriggerEvent::None;
        }

        let start = clock.now_ms();
        loop {
            let held = clock.elapsed_since(start);
            if !input.is_pressed() {
                debug!("Button: short click ({} ms)", held);
                return TriggerEvent::ShortClick;
            }
            if held >= self.long_click_ms {
                info!("Button: long click");
                self.awaiting_release = true;
                return TriggerEvent::LongClick;
            }

            host.poll().await;
            // Land the last sample exactly on the window edge.
            let step = self.sample_ms.max(1).min(self.long_click_ms - held);
            clock.delay_ms(step).await;
        }
    }

    /// `true` between a long click and the release of that press.
    pub fn is_awaiting_release(&self) -> bool {
        self.awaiting_release
    }
}
