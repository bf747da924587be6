//! SSD1306 OLED status screen.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use pwkey::io::{Status, StatusDisplay};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Render the status screen: title line plus one status line.
pub fn draw_status<I2C>(display: &mut Display<I2C>, status: Status)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new("pwkey", Point::new(0, 10), text_style()).draw(display);

    let mut line: heapless::String<20> = heapless::String::new();
    match status {
        Status::Slot(slot) => {
            let _ = write!(line, "{} {}", status.label(), slot + 1);
        }
        _ => {
            let _ = line.push_str(status.label());
        }
    }
    let _ = Text::new(line.as_str(), Point::new(0, 30), text_style()).draw(display);

    let _ = display.flush();
}

/// [`StatusDisplay`] backed by the OLED.
pub struct OledStatus<I2C> {
    display: Display<I2C>,
}

impl<I2C> OledStatus<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    pub fn new(i2c: I2C) -> Self {
        let mut display = init(i2c);
        draw_status(&mut display, Status::Waiting);
        Self { display }
    }
}

impl<I2C> StatusDisplay for OledStatus<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn show(&mut self, status: Status) {
        draw_status(&mut self.display, status);
    }
}
