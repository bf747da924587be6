//! Serial line reading/writing and service-mode reconfiguration.

mod common;

use common::*;
use pwkey::config::{LineMode, ServiceConfig, SERVICE_PROMPT};
use pwkey::config_channel::{ConfigChannel, Line};
use pwkey::io::Clock;
use pwkey::{CredentialStore, Error};

fn echo_channel() -> ConfigChannel {
    ConfigChannel::new(ServiceConfig {
        line_mode: LineMode::Echo,
        ..ServiceConfig::default()
    })
}

#[test]
fn reads_line_without_terminator() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(b"abc\n");
    let mut line = Line::new();

    let n = block_on(ConfigChannel::default().read_line(&mut serial, &clock, &mut line));

    assert_eq!(n, 3);
    assert_eq!(line.as_slice(), b"abc");
}

#[test]
fn crlf_yields_one_line_each() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(b"abc\r\ndef\r\n");
    let channel = ConfigChannel::default();
    let mut line = Line::new();

    block_on(channel.read_line(&mut serial, &clock, &mut line));
    assert_eq!(line.as_slice(), b"abc");
    block_on(channel.read_line(&mut serial, &clock, &mut line));
    assert_eq!(line.as_slice(), b"def");
}

#[test]
fn echo_mode_appends_terminal_newline() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(b"hello\r");
    let mut line = Line::new();

    let n = block_on(echo_channel().read_line(&mut serial, &clock, &mut line));

    assert_eq!(n, 7);
    assert_eq!(line.as_slice(), b"hello\n\r");
}

#[test]
fn overlong_line_is_truncated_and_remainder_drained() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(&[b'k'; 100]);
    serial.feed(b"\nnext\n");
    let channel = ConfigChannel::default();
    let mut line = Line::new();

    assert_eq!(block_on(channel.read_line(&mut serial, &clock, &mut line)), 63);
    assert!(line.iter().all(|&b| b == b'k'));

    block_on(channel.read_line(&mut serial, &clock, &mut line));
    assert_eq!(line.as_slice(), b"next");
}

#[test]
fn idle_timeout_with_no_input_returns_empty() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    let mut line = Line::new();

    let n = block_on(ConfigChannel::default().read_line(&mut serial, &clock, &mut line));

    assert_eq!(n, 0);
    assert!(line.is_empty());
    assert!(clock.now_ms() >= 1000);
    assert!(clock.now_ms() < 1100);
}

#[test]
fn unterminated_line_is_discarded_at_deadline() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(b"pasted");
    let mut line = Line::new();

    let n = block_on(ConfigChannel::default().read_line_until(&mut serial, &clock, &mut line, 3000));

    assert_eq!(n, 0);
    assert!(line.is_empty());
    assert_eq!(clock.now_ms(), 3000, "a started line is not cut by the idle timeout");
}

#[test]
fn disconnected_port_is_a_no_op() {
    let clock = SimClock::new();
    let mut serial = SimSerial::disconnected();
    serial.feed(b"ignored\n");
    let channel = ConfigChannel::default();
    let mut line = Line::new();

    assert_eq!(block_on(channel.read_line(&mut serial, &clock, &mut line)), 0);
    assert_eq!(serial.rx.len(), 8, "nothing consumed");

    let result = block_on(channel.write_line(&mut serial, &clock, b"hi"));
    assert_eq!(result, Err(Error::SerialDisconnected));
    assert!(serial.tx.is_empty());
    assert_eq!(clock.now_ms(), 0);
}

#[test]
fn write_drains_in_chunks() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.write_limit = Some(8);

    block_on(ConfigChannel::default().write_line(&mut serial, &clock, SERVICE_PROMPT.as_bytes()))
        .unwrap();

    assert_eq!(serial.tx_text(), SERVICE_PROMPT);
    assert_eq!(serial.flushes, 1);
}

#[test]
fn stalled_write_times_out() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.write_limit = Some(0);

    let result = block_on(ConfigChannel::default().write_line(&mut serial, &clock, b"stuck"));

    assert_eq!(result, Err(Error::Timeout));
    assert!(clock.now_ms() >= 1000);
}

#[test]
fn reconfigure_prompts_and_replaces_slot_zero() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(b"n3w_Secret!\r\n");
    let mut store = CredentialStore::new();

    let stored = block_on(ConfigChannel::default().reconfigure(&mut serial, &clock, &mut store));

    assert_eq!(stored, Some(11));
    assert_eq!(store.get_active(), b"n3w_Secret!");
    assert_eq!(serial.tx_text(), SERVICE_PROMPT);
}

#[test]
fn reconfigure_in_echo_mode_stores_payload_only() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(b"abc\n");
    let mut store = CredentialStore::new();

    let stored = block_on(echo_channel().reconfigure(&mut serial, &clock, &mut store));

    assert_eq!(stored, Some(3));
    assert_eq!(store.get_active(), b"abc");
    assert_eq!(serial.tx_text(), format!("{}abc\n\r", SERVICE_PROMPT));
}

#[test]
fn reconfigure_truncates_overlong_secret() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    serial.feed(&[b'Q'; 100]);
    serial.feed(b"\n");
    let mut store = CredentialStore::new();

    let stored = block_on(ConfigChannel::default().reconfigure(&mut serial, &clock, &mut store));

    assert_eq!(stored, Some(63));
    let cred = store.active_credential();
    assert_eq!(cred.len(), 63);
    assert_eq!(cred.raw()[63], 0);
}

#[test]
fn reconfigure_keeps_reading_through_pause_mid_line() {
    let clock = SimClock::new();
    let mut serial = SimSerial::typed_at(
        &clock,
        &[
            (100, "a"),
            (200, "b"),
            (1700, "c"),
            (1800, "d"),
            (1900, "\n"),
        ],
    );
    let mut store = CredentialStore::new();

    let stored = block_on(ConfigChannel::default().reconfigure(&mut serial, &clock, &mut store));

    assert_eq!(stored, Some(4));
    assert_eq!(store.get_active(), b"abcd");
    assert!(clock.now_ms() < 2000);
}

#[test]
fn reconfigure_drops_line_unfinished_at_window_close() {
    let clock = SimClock::new();
    let mut serial = SimSerial::typed_at(&clock, &[(9500, "half")]);
    let mut store = CredentialStore::new();

    let stored = block_on(ConfigChannel::default().reconfigure(&mut serial, &clock, &mut store));

    assert_eq!(stored, None);
    assert_eq!(store.get_active(), b"MyT4st_pAs7");
    assert_eq!(clock.now_ms(), 10_000);
}

#[test]
fn reconfigure_window_closes_without_input() {
    let clock = SimClock::new();
    let mut serial = SimSerial::connected();
    let mut store = CredentialStore::new();

    let stored = block_on(ConfigChannel::default().reconfigure(&mut serial, &clock, &mut store));

    assert_eq!(stored, None);
    assert_eq!(store.get_active(), b"MyT4st_pAs7");
    assert!(clock.now_ms() >= 10_000);
}

#[test]
fn reconfigure_waits_out_window_when_disconnected() {
    let clock = SimClock::new();
    let mut serial = SimSerial::disconnected();
    let mut store = CredentialStore::new();

    let stored = block_on(ConfigChannel::default().reconfigure(&mut serial, &clock, &mut store));

    assert_eq!(stored, None);
    assert!(serial.tx.is_empty());
    assert_eq!(clock.now_ms(), 10_000);
}
