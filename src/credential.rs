//! Credential store - the secrets the device types, held in RAM only.
//!
//! Each slot is a fixed buffer that always carries a NUL terminator
//! inside its capacity.  Writes longer than the capacity are truncated,
//! never rejected.  The store also owns the allow-list of proximity
//! cards that may trigger playback.

use crate::config::{
    CREDENTIAL_CAPACITY, DEFAULT_CREDENTIALS, MAX_ALLOWED_CARDS, MAX_CARD_ID_LEN,
    MAX_CREDENTIAL_LEN, SLOT_COUNT,
};
use heapless::Vec;

/// One stored secret.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    buf: [u8; CREDENTIAL_CAPACITY],
}

impl Credential {
    pub const fn empty() -> Self {
        Self {
            buf: [0; CREDENTIAL_CAPACITY],
        }
    }

    /// Build from raw bytes, truncating to capacity - 1.
    ///
    /// An embedded NUL ends the secret early, exactly as it would when
    /// typed.
    pub fn new(bytes: &[u8]) -> Self {
        let mut credential = Self::empty();
        credential.set(bytes);
        credential
    }

    /// Overwrite the whole buffer. Returns the stored length.
    pub fn set(&mut self, bytes: &[u8]) -> usize {
        let len = bytes.len().min(MAX_CREDENTIAL_LEN);
        self.buf = [0; CREDENTIAL_CAPACITY];
        self.buf[..len].copy_from_slice(&bytes[..len]);
        self.len()
    }

    /// Bytes before the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// The full buffer, terminator and padding included.
    pub fn raw(&self) -> &[u8; CREDENTIAL_CAPACITY] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(MAX_CREDENTIAL_LEN)
    }

    pub fn is_empty(&self) -> bool {
        self.buf[0] == 0
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::empty()
    }
}

// Never print the secret itself.
impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("len", &self.len())
            .finish()
    }
}

/// Identifier of a proximity card (UID bytes as reported by the reader).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CardId {
    len: u8,
    bytes: [u8; MAX_CARD_ID_LEN],
}

impl CardId {
    /// Returns `None` for an empty or over-long identifier.
    pub fn new(uid: &[u8]) -> Option<Self> {
        if uid.is_empty() || uid.len() > MAX_CARD_ID_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_CARD_ID_LEN];
        bytes[..uid.len()].copy_from_slice(uid);
        Some(Self {
            len: uid.len() as u8,
            bytes,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

/// All slots plus the active index and the card allow-list.
#[derive(Debug)]
pub struct CredentialStore {
    slots: [Credential; SLOT_COUNT],
    active: usize,
    cards: Vec<CardId, MAX_ALLOWED_CARDS>,
}

impl CredentialStore {
    /// Store loaded with the built-in defaults; slot 0 active.
    pub fn new() -> Self {
        let mut slots = [Credential::empty(); SLOT_COUNT];
        for (slot, default) in slots.iter_mut().zip(DEFAULT_CREDENTIALS) {
            slot.set(default);
        }
        Self {
            slots,
            active: 0,
            cards: Vec::new(),
        }
    }

    /// The credential that the next playback will type.
    pub fn get_active(&self) -> &[u8] {
        self.slots[self.active].as_bytes()
    }

    pub fn active_credential(&self) -> &Credential {
        &self.slots[self.active]
    }

    pub fn active_slot(&self) -> usize {
        self.active
    }

    pub fn slot_count(&self) -> usize {
        SLOT_COUNT
    }

    pub fn slot(&self, index: usize) -> Option<&Credential> {
        self.slots.get(index)
    }

    /// Replace slot 0 with `bytes` (truncated). Returns the stored length.
    pub fn replace(&mut self, bytes: &[u8]) -> usize {
        self.replace_slot(0, bytes).unwrap_or(0)
    }

    /// Replace a specific slot. `None` if the index is out of range.
    pub fn replace_slot(&mut self, index: usize, bytes: &[u8]) -> Option<usize> {
        let slot = self.slots.get_mut(index)?;
        let stored = slot.set(bytes);
        if bytes.len() > stored {
            warn!("Credential truncated: {} -> {} bytes", bytes.len(), stored);
        }
        info!("Slot {} replaced ({} bytes)", index, stored);
        Some(stored)
    }

    /// Make `index` the active slot. Content is not touched.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= SLOT_COUNT {
            warn!("Ignoring select of slot {}", index);
            return false;
        }
        self.active = index;
        true
    }

    /// Advance to the next slot, wrapping around. Returns the new index.
    pub fn toggle(&mut self) -> usize {
        self.active = (self.active + 1) % SLOT_COUNT;
        self.active
    }

    pub fn allowed_cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Add a card to the allow-list. `false` when the list is full.
    pub fn allow_card(&mut self, card: CardId) -> bool {
        if self.cards.contains(&card) {
            return true;
        }
        self.cards.push(card).is_ok()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}
