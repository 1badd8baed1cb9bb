//! Hooks that record every call.

use std::sync::{Arc, Mutex};

use ext_core::{ExtensionHooks, HookError};
use ext_extensions::Direction;

/// One recorded hook call.
pub type HookCall = (Direction, String);

/// Records hook calls in order; optionally fails on one extension.
///
/// Clones share the same log, so keep a clone to inspect calls after
/// handing the hooks to an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    calls: Arc<Mutex<Vec<HookCall>>>,
    fail_on: Option<(Direction, String)>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `direction` hook for `name`. The failing call is still recorded.
    pub fn failing_on(mut self, direction: Direction, name: &str) -> Self {
        self.fail_on = Some((direction, name.to_string()));
        self
    }

    /// All calls so far.
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Names passed to hooks of `direction`, in call order.
    pub fn names(&self, direction: Direction) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(d, _)| *d == direction)
            .map(|(_, name)| name)
            .collect()
    }

    fn record(&self, direction: Direction, name: &str) -> Result<(), HookError> {
        self.calls
            .lock()
            .unwrap()
            .push((direction, name.to_string()));
        match self.fail_on {
            Some((d, ref n)) if d == direction && n == name => {
                Err(HookError::Failed(format!("{direction} of {name} failed")))
            }
            _ => Ok(()),
        }
    }
}

impl ExtensionHooks for RecordingHooks {
    fn on_install(&self, name: &str) -> Result<(), HookError> {
        self.record(Direction::Install, name)
    }

    fn on_uninstall(&self, name: &str) -> Result<(), HookError> {
        self.record(Direction::Uninstall, name)
    }
}
