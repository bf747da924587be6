//! Trigger detection - decides when the credential should be typed.
//!
//! Two independent sources feed one event path:
//!
//! - **Button** ([`button`]) - short/long click classification with a
//!   blocking classification window.
//! - **Card** ([`card`]) - allow-listed proximity card with a re-trigger
//!   cooldown.
//!
//! Each poll yields exactly one [`TriggerEvent`]; events are never queued.

pub mod button;
pub mod card;

pub use button::ButtonDetector;
pub use card::CardDetector;

use crate::config::TriggerConfig;
use crate::credential::CardId;
use crate::hid::HidHost;
use crate::io::{ButtonInput, CardReader, Clock};

/// Outcome of one trigger poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerEvent {
    None,
    ShortClick,
    LongClick,
    CardPresent,
}

/// Both sub-detectors plus the mode selecting which are consulted.
#[derive(Debug)]
pub struct TriggerDetector {
    config: TriggerConfig,
    button: ButtonDetector,
    card: CardDetector,
}

impl TriggerDetector {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            button: ButtonDetector::new(config.long_click_ms, config.sample_ms),
            card: CardDetector::with_retry_backoff(config.card_cooldown_ms, config.card_retry_ms),
        }
    }

    /// Poll the enabled sources. The card is checked first so a tap is
    /// never delayed by a button classification window.
    pub async fn poll<B, R, H, C>(
        &mut self,
        button: &mut B,
        reader: &mut R,
        cards: &[CardId],
        host: &mut H,
        clock: &C,
    ) -> TriggerEvent
    where
        B: ButtonInput,
        R: CardReader,
        H: HidHost,
        C: Clock,
    {
        if self.config.mode.card_enabled() {
            let event = self.card.poll(reader, cards, clock.now_ms());
            if event != TriggerEvent::None {
                return event;
            }
        }

        if self.config.mode.button_enabled() {
            return self.button.poll(button, host, clock).await;
        }

        TriggerEvent::None
    }

    /// Record a successful playback started at `trigger_ms`; arms the
    /// card cooldown.
    pub fn playback_succeeded(&mut self, trigger_ms: u64) {
        self.card.arm_cooldown(trigger_ms);
    }

    /// Record an aborted playback. A card trigger backs off so the button
    /// is still consulted while the card stays in the field.
    pub fn playback_aborted(&mut self, event: TriggerEvent, now_ms: u64) {
        if event == TriggerEvent::CardPresent {
            self.card.back_off(now_ms);
        }
    }

    pub fn button(&self) -> &ButtonDetector {
        &self.button
    }

    pub fn card(&self) -> &CardDetector {
        &self.card
    }
}
