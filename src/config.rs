//! Application-wide constants and runtime configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.  The runtime
//! structs at the bottom default to these constants.

// Credentials

/// Credential buffer size including the NUL terminator.
pub const CREDENTIAL_CAPACITY: usize = 64;

/// Longest storable secret (one byte is reserved for the terminator).
pub const MAX_CREDENTIAL_LEN: usize = CREDENTIAL_CAPACITY - 1;

/// Number of selectable credential slots.
pub const SLOT_COUNT: usize = 2;

/// Built-in secrets loaded at power-up (RAM only, never persisted).
pub const DEFAULT_CREDENTIALS: [&[u8]; SLOT_COUNT] = [b"MyT4st_pAs7", b"S3c0nd_pAs8"];

/// Maximum number of allow-listed proximity cards.
pub const MAX_ALLOWED_CARDS: usize = 4;

/// Longest card identifier (ISO 14443 triple-size UID).
pub const MAX_CARD_ID_LEN: usize = 10;

// Trigger timing

/// Press longer than this classifies as a long click (ms).
pub const LONG_CLICK_WINDOW_MS: u64 = 1500;

/// Button sampling interval during classification (ms).
pub const BUTTON_SAMPLE_MS: u64 = 10;

/// Card re-trigger suppression after a successful playback (ms).
pub const CARD_COOLDOWN_MS: u64 = 5000;

/// Card suppression after a playback that aborted (ms). Gives the button
/// a turn while a card stays on the reader of an unreachable host.
pub const CARD_RETRY_BACKOFF_MS: u64 = 1000;

/// Main loop pause when a tick found nothing to do (ms).
pub const MAIN_LOOP_INTERVAL_MS: u64 = 10;

// Playback timing

/// Bound on each wait for the host to accept a report (ms).
pub const HOST_READY_TIMEOUT_MS: u64 = 1000;

/// Interval between device-stack polls while waiting for the host (ms).
pub const HOST_POLL_INTERVAL_MS: u64 = 1;

/// Hold time after each key-down and key-up report (ms).
pub const KEY_DWELL_MS: u64 = 25;

/// Hold time after a standalone idle (all-zero) report (ms).
pub const IDLE_REPORT_DWELL_MS: u64 = 50;

// Serial configuration channel

/// Idle timeout for a serial line read (ms).
pub const SERIAL_IDLE_TIMEOUT_MS: u64 = 1000;

/// How long service mode waits for a new credential (ms).
pub const SERVICE_WINDOW_MS: u64 = 10_000;

/// Interval between serial polls while waiting for input (ms).
pub const SERIAL_POLL_INTERVAL_MS: u64 = 1;

/// Prompt written when service mode starts.
pub const SERVICE_PROMPT: &str = "Please enter new password: ";

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "pwkey";
pub const USB_PRODUCT: &str = "Password Key";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 5;

/// CDC-ACM bulk packet size.
pub const USB_CDC_PACKET_SIZE: u16 = 64;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Action button  → P0.11 (active-low, internal pull-up)
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27

// Runtime configuration

/// How playback waits for the host to accept the next report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostWait {
    /// Give up after the given number of milliseconds.
    Bounded(u64),
    /// Wait forever. The device hangs if the host never drains.
    Unbounded,
}

/// Playback engine parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackConfig {
    pub host_wait: HostWait,
    pub dwell_ms: u64,
    pub idle_dwell_ms: u64,
    /// Skip characters with no keycode instead of sending empty reports.
    pub skip_unmapped: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            host_wait: HostWait::Bounded(HOST_READY_TIMEOUT_MS),
            dwell_ms: KEY_DWELL_MS,
            idle_dwell_ms: IDLE_REPORT_DWELL_MS,
            skip_unmapped: true,
        }
    }
}

/// Which physical sources may fire a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerMode {
    ButtonOnly,
    CardOnly,
    Both,
}

impl TriggerMode {
    pub fn button_enabled(self) -> bool {
        matches!(self, TriggerMode::ButtonOnly | TriggerMode::Both)
    }

    pub fn card_enabled(self) -> bool {
        matches!(self, TriggerMode::CardOnly | TriggerMode::Both)
    }
}

/// What a short click does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShortClickAction {
    /// Type the active credential.
    Play,
    /// Switch to the next credential slot.
    ToggleSlot,
}

/// Trigger detector parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerConfig {
    pub mode: TriggerMode,
    pub long_click_ms: u64,
    pub sample_ms: u64,
    pub card_cooldown_ms: u64,
    pub card_retry_ms: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            mode: TriggerMode::ButtonOnly,
            long_click_ms: LONG_CLICK_WINDOW_MS,
            sample_ms: BUTTON_SAMPLE_MS,
            card_cooldown_ms: CARD_COOLDOWN_MS,
            card_retry_ms: CARD_RETRY_BACKOFF_MS,
        }
    }
}

/// How line terminators are handled by the serial reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineMode {
    /// Drop CR/LF; the line holds only the payload.
    Strip,
    /// Append `"\n\r"` after the payload, like a terminal echo.
    Echo,
}

/// Service-mode (credential reconfiguration) parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceConfig {
    pub idle_timeout_ms: u64,
    pub window_ms: u64,
    pub line_mode: LineMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: SERIAL_IDLE_TIMEOUT_MS,
            window_ms: SERVICE_WINDOW_MS,
            line_mode: LineMode::Strip,
        }
    }
}

/// Everything the orchestrator needs to know about this build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub triggers: TriggerConfig,
    pub short_click: ShortClickAction,
    pub playback: PlaybackConfig,
    pub service: ServiceConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            triggers: TriggerConfig::default(),
            short_click: ShortClickAction::Play,
            playback: PlaybackConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Card taps type the credential, the button selects slots and
    /// enters service mode.
    pub fn card_reader() -> Self {
        Self {
            triggers: TriggerConfig {
                mode: TriggerMode::Both,
                ..TriggerConfig::default()
            },
            short_click: ShortClickAction::ToggleSlot,
            ..Self::default()
        }
    }
}
