//! Windows as the render loop sees them: identity, key bindings and per-frame handlers.

mod base;
mod registry;

pub use base::{WindowBase, WindowIdentity};
pub use registry::WindowRegistry;

use crate::render::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub button: u32,
    pub state: ButtonState,
    pub x: f64,
    pub y: f64,
}

/// Capabilities the window manager dispatches to. Implementors compose a
/// [`WindowBase`] for identity and key handling.
pub trait Window {
    fn base(&self) -> &WindowBase;

    /// Draws one frame. Implementations take the shared lock themselves.
    fn display_handler(&self, surface: &mut dyn Surface);

    fn reshape_handler(&self, width: i32, height: i32) {
        self.base().reshape(width, height);
    }

    fn mouse_handler(&self, _event: MouseEvent) {}

    fn key_handler(&self, key: char) -> bool {
        self.base().keys().dispatch(key)
    }

    fn id(&self) -> WindowId {
        self.base().id()
    }
}
