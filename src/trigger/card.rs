//! Proximity card trigger with re-trigger cooldown.
//!
//! A successful playback silences the card for the full cooldown from
//! its trigger time.  An aborted one only silences it for the short retry
//! back-off, counted from the abort.

use super::TriggerEvent;
use crate::credential::CardId;
use crate::io::CardReader;

#[derive(Debug)]
pub struct CardDetector {
    cooldown_ms: u64,
    retry_ms: u64,
    quiet_until_ms: Option<u64>,
}

impl CardDetector {
    pub const fn new(cooldown_ms: u64) -> Self {
        Self::with_retry_backoff(cooldown_ms, 0)
    }

    pub const fn with_retry_backoff(cooldown_ms: u64, retry_ms: u64) -> Self {
        Self {
            cooldown_ms,
            retry_ms,
            quiet_until_ms: None,
        }
    }

    /// `CardPresent` if an allow-listed card is in the field and the
    /// cooldown since the last successful playback has elapsed.
    pub fn poll<R: CardReader>(&mut self, reader: &mut R, cards: &[CardId], now_ms: u64) -> TriggerEvent {
        if !cards.iter().any(|card| reader.is_card_present(card)) {
            return TriggerEvent::None;
        }

        if self.in_cooldown(now_ms) {
            trace!("Card: present but cooling down");
            return TriggerEvent::None;
        }

        info!("Card: registered card present");
        TriggerEvent::CardPresent
    }

    pub fn in_cooldown(&self, now_ms: u64) -> bool {
        self.quiet_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Start the cooldown from the trigger time of a successful playback.
    pub fn arm_cooldown(&mut self, trigger_ms: u64) {
        self.quiet_until_ms = Some(trigger_ms.saturating_add(self.cooldown_ms));
    }

    /// Hold the card off briefly after an aborted playback. Never
    /// shortens a cooldown already running.
    pub fn back_off(&mut self, now_ms: u64) {
        let until = now_ms.saturating_add(self.retry_ms);
        self.quiet_until_ms = Some(self.quiet_until_ms.map_or(until, |q| q.max(until)));
    }
}
