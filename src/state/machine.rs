use super::error::{RegistrationError, RegistrationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerState {
    #[default]
    Uninitialized,
    Initialized,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerEvent {
    Initialize,
    StartLoop,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerTransition {
    pub from: ManagerState,
    pub event: ManagerEvent,
    pub to: ManagerState,
}

/// Lifecycle of the window manager: `Uninitialized → Initialized → Running → Stopped`.
#[derive(Debug, Default)]
pub struct ManagerStateMachine {
    state: ManagerState,
    transition_history: Vec<ManagerTransition>,
}

impl ManagerStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn can_transition(&self, event: ManagerEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: ManagerEvent) -> Option<ManagerState> {
        use ManagerEvent::*;
        match (self.state, event) {
            (ManagerState::Uninitialized, Initialize) => Some(ManagerState::Initialized),
            (ManagerState::Initialized, StartLoop) => Some(ManagerState::Running),
            (ManagerState::Running, Stop) => Some(ManagerState::Stopped),
            _ => None,
        }
    }

    pub fn accepts_registration(&self) -> bool {
        matches!(
            self.state,
            ManagerState::Initialized | ManagerState::Running
        )
    }

    pub fn transition(&mut self, event: ManagerEvent) -> RegistrationResult<ManagerState> {
        tracing::debug!(from = ?self.state, event = ?event, "request window manager transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid window manager transition requested");
            RegistrationError::InvalidTransition { from, event }
        })?;

        self.transition_history.push(ManagerTransition {
            from: self.state,
            event,
            to: next,
        });
        self.state = next;

        Ok(self.state)
    }
}

#[cfg(test)]
impl ManagerStateMachine {
    fn history(&self) -> &[ManagerTransition] {
        &self.transition_history
    }
}

impl std::fmt::Display for ManagerStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ManagerState::{:?}", self.state)
    }
}
