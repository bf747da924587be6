//! Board glue that does not belong to USB or the UI.

use embassy_time::{Duration, Instant, Timer};
use pwkey::io::Clock;

/// [`Clock`] over the Embassy time driver (RTC1 on the nRF52840).
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn delay_ms(&self, ms: u64) {
        Timer::after(Duration::from_millis(ms)).await;
    }
}
