//! Orchestrator - the single cooperative main loop.
//!
//! Each tick services the device stack, polls the trigger detector and
//! dispatches the resulting event:
//!
//! | Event          | Action                                        |
//! |----------------|-----------------------------------------------|
//! | `CardPresent`  | type the active credential                    |
//! | `ShortClick`   | type it, or switch slot ([`ShortClickAction`]) |
//! | `LongClick`    | service mode: read a new credential on serial |
//!
//! All mutable state lives in [`DeviceState`], owned here and lent to
//! the components for the duration of one call.

use crate::config::{DeviceConfig, ShortClickAction, MAIN_LOOP_INTERVAL_MS};
use crate::config_channel::{ConfigChannel, SerialPort};
use crate::credential::CredentialStore;
use crate::error::Error;
use crate::hid::HidHost;
use crate::io::{ButtonInput, CardReader, Clock, Status, StatusDisplay};
use crate::playback::{self, Completed};
use crate::trigger::{TriggerDetector, TriggerEvent};

/// Whether the device is typing-ready or reading a new credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Normal,
    Service,
}

/// Everything that survives between ticks.
#[derive(Debug)]
pub struct DeviceState {
    pub credentials: CredentialStore,
    pub triggers: TriggerDetector,
    pub mode: Mode,
    /// A key may still be down on the host; send an idle report. Stays
    /// set until one goes through.
    keys_dirty: bool,
    /// The host just failed a wait; the idle report is only retried once
    /// it reports ready.
    idle_retry: bool,
}

impl DeviceState {
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            credentials: CredentialStore::new(),
            triggers: TriggerDetector::new(config.triggers),
            mode: Mode::Normal,
            keys_dirty: true,
            idle_retry: false,
        }
    }
}

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Idle,
    Played(Completed),
    Aborted(Error),
    SlotSelected(usize),
    /// Service mode ended; `Some(len)` if a credential was stored.
    Reconfigured(Option<usize>),
}

pub struct Orchestrator<H, S, B, R, C, D> {
    state: DeviceState,
    config: DeviceConfig,
    channel: ConfigChannel,
    host: H,
    serial: S,
    button: B,
    reader: R,
    clock: C,
    display: D,
}

impl<H, S, B, R, C, D> Orchestrator<H, S, B, R, C, D>
where
    H: HidHost,
    S: SerialPort,
    B: ButtonInput,
    R: CardReader,
    C: Clock,
    D: StatusDisplay,
{
    pub fn new(
        config: DeviceConfig,
        host: H,
        serial: S,
        button: B,
        reader: R,
        clock: C,
        display: D,
    ) -> Self {
        Self {
            state: DeviceState::new(&config),
            channel: ConfigChannel::new(config.service),
            config,
            host,
            serial,
            button,
            reader,
            clock,
            display,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Run forever.
    pub async fn run(&mut self) -> ! {
        info!("Main loop started ({})", self.config.triggers.mode);
        self.display.show(Status::Waiting);
        loop {
            if self.tick().await == Outcome::Idle {
                self.clock.delay_ms(MAIN_LOOP_INTERVAL_MS).await;
            }
        }
    }

    /// One main-loop iteration.
    pub async fn tick(&mut self) -> Outcome {
        self.host.poll().await;

        if self.state.keys_dirty {
            self.release_keys().await;
        }

        let event = self
            .state
            .triggers
            .poll(
                &mut self.button,
                &mut self.reader,
                self.state.credentials.allowed_cards(),
                &mut self.host,
                &self.clock,
            )
            .await;

        match event {
            TriggerEvent::None => Outcome::Idle,
            TriggerEvent::CardPresent => self.play_active(event).await,
            TriggerEvent::ShortClick => match self.config.short_click {
                ShortClickAction::Play => self.play_active(event).await,
                ShortClickAction::ToggleSlot => self.toggle_slot(),
            },
            TriggerEvent::LongClick => self.service_mode().await,
        }
    }

    /// Clear the host's key state. The first attempt waits for the host
    /// like playback does; retries only go out once it is ready.
    async fn release_keys(&mut self) {
        if self.state.idle_retry && !self.host.is_ready() {
            return;
        }
        match playback::send_idle_report(&mut self.host, &self.clock, &self.config.playback).await
        {
            Ok(()) => {
                self.state.keys_dirty = false;
                self.state.idle_retry = false;
            }
            Err(e) => {
                warn!("Idle report not sent, retrying when host is ready: {}", e);
                self.state.idle_retry = true;
            }
        }
    }

    async fn play_active(&mut self, event: TriggerEvent) -> Outcome {
        let trigger_ms = self.clock.now_ms();
        let credential = *self.state.credentials.active_credential();
        info!(
            "Typing slot {} ({} bytes)",
            self.state.credentials.active_slot(),
            credential.len()
        );

        self.display.show(Status::Sending);
        let result = playback::play(
            &mut self.host,
            &self.clock,
            credential.as_bytes(),
            &self.config.playback,
        )
        .await;
        self.state.keys_dirty = true;
        self.state.idle_retry = result.is_err();

        match result {
            Ok(done) => {
                self.state.triggers.playback_succeeded(trigger_ms);
                self.display.show(Status::Waiting);
                Outcome::Played(done)
            }
            Err(e) => {
                warn!("Playback aborted: {}", e);
                self.state
                    .triggers
                    .playback_aborted(event, self.clock.now_ms());
                self.display.show(Status::HostError);
                Outcome::Aborted(e)
            }
        }
    }

    fn toggle_slot(&mut self) -> Outcome {
        let slot = self.state.credentials.toggle();
        info!("Active slot: {}", slot);
        self.display.show(Status::Slot(slot));
        Outcome::SlotSelected(slot)
    }

    async fn service_mode(&mut self) -> Outcome {
        self.state.mode = Mode::Service;
        self.display.show(Status::ServiceMode);

        let stored = self
            .channel
            .reconfigure(&mut self.serial, &self.clock, &mut self.state.credentials)
            .await;

        self.state.mode = Mode::Normal;
        self.display.show(Status::Waiting);
        Outcome::Reconfigured(stored)
    }
}
