//! Selection state machine for the interactive picker.
//!
//! Pure state, no I/O: the event loop in [`crate::tui`] feeds it input
//! events and the apply completion, and renders from it. Phases move
//! strictly forward: Browsing → Applying → Done, or Browsing → Done on
//! quit.

use crate::error::Error;
use crate::git::Identity;
use crate::profile::ProfileEntry;

/// Semantic input events, already mapped from key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Up,
    Down,
    ToggleSignOff,
    ToggleGpgSign,
    ToggleHelp,
    Confirm,
    Quit,
}

/// Where the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The chosen profile was applied.
    Applied,
    /// The user quit without applying.
    Aborted,
    /// Applying the chosen profile failed; the error is stored on the model.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Browsing,
    Applying,
    Done(Outcome),
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write this profile to the identity backend. Emitted exactly once per
    /// run, on confirm.
    Apply(ProfileEntry),
}

/// In-memory state of the interactive list.
#[derive(Debug)]
pub struct SelectionModel {
    entries: Vec<ProfileEntry>,
    current: Option<Identity>,
    cursor: usize,
    chosen: Option<usize>,
    last_error: Option<Error>,
    phase: Phase,
    show_full_help: bool,
}

impl SelectionModel {
    pub fn new(entries: Vec<ProfileEntry>, current: Option<Identity>) -> Self {
        Self {
            entries,
            current,
            cursor: 0,
            chosen: None,
            last_error: None,
            phase: Phase::Browsing,
            show_full_help: false,
        }
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn show_full_help(&self) -> bool {
        self.show_full_help
    }

    /// The entry chosen on confirm, once there is one.
    pub fn chosen(&self) -> Option<&ProfileEntry> {
        self.chosen.and_then(|i| self.entries.get(i))
    }

    /// Take the stored apply error out of the model.
    pub fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    /// Process one input event. Only honored while Browsing; after confirm
    /// or quit, input is ignored.
    pub fn on_input(&mut self, event: InputEvent) -> Option<Effect> {
        if self.phase != Phase::Browsing {
            return None;
        }

        match event {
            InputEvent::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            InputEvent::Down => {
                if self.cursor + 1 < self.entries.len() {
                    self.cursor += 1;
                }
                None
            }
            InputEvent::ToggleSignOff => {
                if let Some(entry) = self.entries.get_mut(self.cursor) {
                    entry.profile.signoff = !entry.profile.signoff;
                }
                None
            }
            InputEvent::ToggleGpgSign => {
                if let Some(entry) = self.entries.get_mut(self.cursor) {
                    entry.profile.gpgsign = !entry.profile.gpgsign;
                }
                None
            }
            InputEvent::ToggleHelp => {
                self.show_full_help = !self.show_full_help;
                None
            }
            InputEvent::Confirm => {
                // With no entries there is nothing to choose; stay put.
                let entry = self.entries.get(self.cursor)?.clone();
                self.chosen = Some(self.cursor);
                self.phase = Phase::Applying;
                Some(Effect::Apply(entry))
            }
            InputEvent::Quit => {
                self.phase = Phase::Done(Outcome::Aborted);
                None
            }
        }
    }

    /// Process the apply completion. Only honored while Applying.
    pub fn on_applied(&mut self, result: Result<(), Error>) {
        if self.phase != Phase::Applying {
            return;
        }
        match result {
            Ok(()) => self.phase = Phase::Done(Outcome::Applied),
            Err(err) => {
                self.last_error = Some(err);
                self.phase = Phase::Done(Outcome::Failed);
            }
        }
    }
}
