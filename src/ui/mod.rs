//! User interface subsystem - OLED status screen + action button.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C, shows the current [`Status`]
//! - **Button**: one tactile switch; short click plays, long click opens
//!   service mode
//!
//! [`Status`]: pwkey::io::Status

pub mod buttons;
pub mod display;
