use super::machine::{ManagerEvent, ManagerState};
use crate::window::WindowId;
use thiserror::Error;

pub type RegistrationResult<T> = std::result::Result<T, RegistrationError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid window manager transition: from {from:?} using event {event:?}")]
    InvalidTransition {
        from: ManagerState,
        event: ManagerEvent,
    },
    #[error("window manager is already initialized in this process")]
    AlreadyInitialized,
    #[error("no display available: {0}")]
    NoDisplay(String),
    #[error("windows cannot be registered while the manager is {state:?}")]
    RegistrationClosed { state: ManagerState },
    #[error("window {0} is not registered")]
    UnknownWindow(WindowId),
}
