//! Unit tests for keyboard report construction and serialization.

use super::keyboard::{KeyboardReport, KEYBOARD_REPORT_DESCRIPTOR, MODIFIER_LEFT_SHIFT};
use crate::keymap::{self, KeyStroke};

// ═══════════════════════════════════════════════════════════════════════════
// Keyboard Report Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn keyboard_report_empty() {
    let report = KeyboardReport::empty();
    assert!(report.is_empty());
    assert_eq!(report.modifier, 0);
    assert_eq!(report.keycodes, [0; 6]);
    assert_eq!(report, KeyboardReport::default());
}

#[test]
fn key_down_uses_only_first_slot() {
    let report = KeyboardReport::key_down(keymap::map(b'Q'));
    assert_eq!(report.modifier, MODIFIER_LEFT_SHIFT);
    assert_eq!(report.reserved, 0);
    assert_eq!(report.keycodes, [0x14, 0, 0, 0, 0, 0]);
    assert!(!report.is_empty());
    assert_eq!(report.stroke(), keymap::map(b'Q'));
}

#[test]
fn key_down_of_sentinel_is_empty() {
    assert!(KeyboardReport::key_down(KeyStroke::SENTINEL).is_empty());
}

#[test]
fn keyboard_report_serialize_layout() {
    let report = KeyboardReport::key_down(keymap::map(b'?'));
    let mut buf = [0xAAu8; 8];
    let written = report.serialize(&mut buf);

    assert_eq!(written, 8);
    assert_eq!(buf, [0x02, 0x00, 0x38, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn keyboard_report_serialize_buffer_too_small() {
    let report = KeyboardReport::empty();
    let mut small_buf = [0u8; 4];
    let written = report.serialize(&mut small_buf);
    assert_eq!(written, 0); // Should fail gracefully
}

#[test]
fn report_descriptor_is_a_closed_keyboard_collection() {
    assert_eq!(&KEYBOARD_REPORT_DESCRIPTOR[..4], &[0x05, 0x01, 0x09, 0x06]);
    assert_eq!(KEYBOARD_REPORT_DESCRIPTOR.last(), Some(&0xC0));
}
