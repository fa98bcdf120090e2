use std::rc::Rc;

use crate::error::{AppError, AppResult};
use crate::input::key_label;
use crate::state::{
    ManagerEvent, ManagerState, ManagerStateMachine, RegistrationError, RegistrationResult,
};
use crate::window::{Window, WindowId, WindowRegistry};

/// Answered by the manager when the focused window has not bound it.
pub const HELP_KEY: char = 'h';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Help,
    Ignored,
}

/// Toolkit-independent half of the window manager: lifecycle plus id → window lookup.
#[derive(Debug, Default)]
pub struct WindowDispatcher {
    machine: ManagerStateMachine,
    registry: WindowRegistry,
}

impl WindowDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ManagerState {
        self.machine.state()
    }

    pub fn transition(&mut self, event: ManagerEvent) -> RegistrationResult<ManagerState> {
        self.machine.transition(event)
    }

    /// Allocates an id and hands it to `build`; the built window joins the registry.
    pub fn register_with<W, F, E>(&mut self, build: F) -> AppResult<Rc<W>>
    where
        W: Window + 'static,
        F: FnOnce(WindowId) -> Result<W, E>,
        AppError: From<E>,
    {
        if !self.machine.accepts_registration() {
            return Err(RegistrationError::RegistrationClosed {
                state: self.machine.state(),
            }
            .into());
        }

        let id = self.registry.allocate_id();
        let window = Rc::new(build(id)?);
        self.registry.insert(window.clone());
        tracing::info!(window_id = %window.id(), name = window.base().name().as_str(), "registered window");
        Ok(window)
    }

    pub fn unregister(&mut self, id: WindowId) -> RegistrationResult<Rc<dyn Window>> {
        let window = self
            .registry
            .remove(id)
            .ok_or(RegistrationError::UnknownWindow(id))?;
        tracing::info!(window_id = %id, "unregistered window");
        Ok(window)
    }

    pub fn window(&self, id: WindowId) -> RegistrationResult<Rc<dyn Window>> {
        self.registry
            .get(id)
            .ok_or(RegistrationError::UnknownWindow(id))
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.registry.ids()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

pub fn dispatch_key(window: &dyn Window, key: char) -> KeyOutcome {
    if window.key_handler(key) {
        return KeyOutcome::Handled;
    }
    if key == HELP_KEY {
        log_key_help(window);
        return KeyOutcome::Help;
    }
    tracing::trace!(window_id = %window.id(), key = %key_label(key), "ignored unbound key");
    KeyOutcome::Ignored
}

fn log_key_help(window: &dyn Window) {
    let name = window.base().name();
    tracing::info!(window = name.as_str(), "key bindings:");
    for (key, description) in window.base().keys().describe_all() {
        tracing::info!(window = name.as_str(), key = %key_label(key), "{description}");
    }
}
