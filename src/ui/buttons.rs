//! GPIO action button.
//!
//! One tactile switch, active-low with the internal pull-up.  Click
//! classification (short / long, release latch) lives in the library's
//! trigger detector; this side only reports the level.

use embassy_nrf::gpio::{AnyPin, Input, Pull};
use pwkey::io::ButtonInput;

pub struct PushButton {
    pin: Input<'static>,
}

impl PushButton {
    pub fn new(pin: AnyPin) -> Self {
        Self {
            pin: Input::new(pin, Pull::Up),
        }
    }
}

impl ButtonInput for PushButton {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low()
    }
}
