//! Simulated collaborators for host tests.
//!
//! Time only moves when code under test sleeps (or a test sets it), so
//! every scenario is deterministic.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use pwkey::config_channel::SerialPort;
use pwkey::hid::HidHost;
use pwkey::io::{ButtonInput, CardReader, Clock, Status, StatusDisplay};
use pwkey::{keymap, CardId, KeyboardReport};

pub use embassy_futures::block_on;

#[derive(Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        assert!(ms >= self.now.get(), "time never runs backwards");
        self.now.set(ms);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    async fn delay_ms(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

/// USB device stack double that records every report with its send time.
pub struct SimHost {
    clock: SimClock,
    pub reports: Vec<(u64, KeyboardReport)>,
    pub suspended: bool,
    pub wake_enabled: bool,
    pub wake_requests: usize,
    /// Host is not ready before this time.
    pub ready_from_ms: u64,
    pub never_ready: bool,
    /// Polls needed to drain each report before the next is accepted.
    pub drain_polls: usize,
    pub reject: bool,
    pub polls: usize,
    busy: usize,
}

impl SimHost {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            reports: Vec::new(),
            suspended: false,
            wake_enabled: true,
            wake_requests: 0,
            ready_from_ms: 0,
            never_ready: false,
            drain_polls: 0,
            reject: false,
            polls: 0,
            busy: 0,
        }
    }

    pub fn sent(&self) -> Vec<KeyboardReport> {
        self.reports.iter().map(|(_, r)| *r).collect()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }

    /// The host reads out the pending report at once.
    pub fn drain(&mut self) {
        self.busy = 0;
    }
}

impl HidHost for SimHost {
    async fn poll(&mut self) {
        self.polls += 1;
        self.busy = self.busy.saturating_sub(1);
    }

    fn is_ready(&self) -> bool {
        !self.suspended
            && !self.never_ready
            && self.clock.now_ms() >= self.ready_from_ms
            && self.busy == 0
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn remote_wakeup(&mut self) -> bool {
        self.wake_requests += 1;
        if self.wake_enabled {
            self.suspended = false;
        }
        self.wake_enabled
    }

    fn send_report(&mut self, report: &KeyboardReport) -> bool {
        if self.reject {
            return false;
        }
        self.reports.push((self.clock.now_ms(), *report));
        self.busy = self.drain_polls;
        true
    }
}

/// Text typed by a report sequence (key-down reports only).
pub fn typed(reports: &[KeyboardReport]) -> String {
    reports
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| keymap::unmap(r.stroke()).map_or('?', char::from))
        .collect()
}

/// Asserts the down/up alternation of a playback.
pub fn assert_press_release_pairs(reports: &[KeyboardReport]) {
    assert_eq!(reports.len() % 2, 0, "odd number of reports");
    for pair in reports.chunks(2) {
        assert!(!pair[0].is_empty(), "expected key-down, got {:?}", pair[0]);
        assert!(pair[1].is_empty(), "expected key-up, got {:?}", pair[1]);
    }
}

/// CDC port double.
pub struct SimSerial {
    pub connected: bool,
    pub rx: VecDeque<u8>,
    /// Bytes that only become readable at their timestamp.
    scheduled: VecDeque<(u64, u8)>,
    clock: Option<SimClock>,
    pub tx: Vec<u8>,
    /// Max bytes accepted per `write` call (`None` = unlimited).
    pub write_limit: Option<usize>,
    pub flushes: usize,
}

impl SimSerial {
    pub fn connected() -> Self {
        Self {
            connected: true,
            rx: VecDeque::new(),
            scheduled: VecDeque::new(),
            clock: None,
            tx: Vec::new(),
            write_limit: None,
            flushes: 0,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::connected()
        }
    }

    /// Connected port whose input arrives as `(time_ms, bytes)` bursts.
    pub fn typed_at(clock: &SimClock, bursts: &[(u64, &str)]) -> Self {
        let mut serial = Self::connected();
        serial.clock = Some(clock.clone());
        for &(at, text) in bursts {
            serial.scheduled.extend(text.bytes().map(|b| (at, b)));
        }
        serial
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn tx_text(&self) -> String {
        String::from_utf8_lossy(&self.tx).into_owned()
    }
}

impl SerialPort for SimSerial {
    async fn poll(&mut self) {}

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read_byte(&mut self) -> Option<u8> {
        if let Some(byte) = self.rx.pop_front() {
            return Some(byte);
        }
        let now = self.clock.as_ref()?.now_ms();
        match self.scheduled.front() {
            Some(&(at, byte)) if at <= now => {
                self.scheduled.pop_front();
                Some(byte)
            }
            _ => None,
        }
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let n = self.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
        self.tx.extend_from_slice(&data[..n]);
        n
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Button pressed during the given inclusive time ranges.
pub struct ScriptedButton {
    clock: SimClock,
    presses: Vec<(u64, u64)>,
}

impl ScriptedButton {
    pub fn new(clock: &SimClock, presses: &[(u64, u64)]) -> Self {
        Self {
            clock: clock.clone(),
            presses: presses.to_vec(),
        }
    }

    pub fn idle(clock: &SimClock) -> Self {
        Self::new(clock, &[])
    }
}

impl ButtonInput for ScriptedButton {
    fn is_pressed(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.presses
            .iter()
            .any(|&(start, end)| start <= now && now <= end)
    }
}

/// A single card lying on the reader during the given time ranges.
pub struct SimCardReader {
    clock: SimClock,
    uid: Vec<u8>,
    present: Vec<(u64, u64)>,
    pub queries: usize,
}

impl SimCardReader {
    pub fn new(clock: &SimClock, uid: &[u8], present: &[(u64, u64)]) -> Self {
        Self {
            clock: clock.clone(),
            uid: uid.to_vec(),
            present: present.to_vec(),
            queries: 0,
        }
    }

    pub fn absent(clock: &SimClock) -> Self {
        Self::new(clock, &[], &[])
    }
}

impl CardReader for SimCardReader {
    fn is_card_present(&mut self, card: &CardId) -> bool {
        self.queries += 1;
        let now = self.clock.now_ms();
        card.as_bytes() == self.uid.as_slice()
            && self
                .present
                .iter()
                .any(|&(start, end)| start <= now && now <= end)
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Vec<Status>,
}

impl StatusDisplay for RecordingDisplay {
    fn show(&mut self, status: Status) {
        self.shown.push(status);
    }
}

pub const CARD_UID: [u8; 4] = [0x04, 0xA2, 0x3C, 0x91];

pub fn card() -> CardId {
    CardId::new(&CARD_UID).expect("valid uid")
}
