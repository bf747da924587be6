//! Board-facing collaborator traits.
//!
//! The firmware binary implements these over Embassy peripherals; the
//! host tests implement them with scripted doubles.

use crate::credential::CardId;

/// Monotonic millisecond time plus a cooperative sleep.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now_ms(&self) -> u64;

    /// Sleep, letting other tasks on the executor run.
    async fn delay_ms(&self, ms: u64);

    fn elapsed_since(&self, start_ms: u64) -> u64 {
        self.now_ms().saturating_sub(start_ms)
    }
}

/// The action button, already decoded from its electrical level.
pub trait ButtonInput {
    /// `true` while the button is held (pin pulled low).
    fn is_pressed(&mut self) -> bool;
}

/// The proximity-card reader. The wire protocol and UID comparison
/// belong to the reader driver.
pub trait CardReader {
    /// `true` if a card with this identifier is in the field right now.
    fn is_card_present(&mut self, card: &CardId) -> bool;
}

/// Reader for builds without a proximity module fitted.
pub struct NoCardReader;

impl CardReader for NoCardReader {
    fn is_card_present(&mut self, _card: &CardId) -> bool {
        false
    }
}

/// What the status screen is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Waiting,
    Sending,
    ServiceMode,
    HostError,
    /// Zero-based slot index; shown as "password N".
    Slot(usize),
}

impl Status {
    /// Short label for a text display. `Slot` is rendered by the caller.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Waiting => "Waiting",
            Status::Sending => "Sending",
            Status::ServiceMode => "Service mode",
            Status::HostError => "Host error",
            Status::Slot(_) => "password",
        }
    }
}

/// Cosmetic status output. Failures are the display's problem.
pub trait StatusDisplay {
    fn show(&mut self, status: Status);
}
