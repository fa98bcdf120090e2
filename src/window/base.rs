use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use crate::geometry::{WindowGeometry, WindowPosition, WindowSize};
use crate::input::{KeyBindingResult, KeyBindingTable, ESCAPE_KEY};
use crate::state::SharedContext;

use super::WindowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowIdentity {
    pub id: WindowId,
    pub name: String,
    pub geometry: WindowGeometry,
    pub previous_geometry: WindowGeometry,
    pub fullscreen: bool,
}

impl WindowIdentity {
    pub fn new(id: WindowId, name: impl Into<String>, geometry: WindowGeometry) -> Self {
        Self {
            id,
            name: name.into(),
            geometry,
            previous_geometry: geometry,
            fullscreen: false,
        }
    }

    /// Swaps current and previous geometry; the native side reshapes afterwards.
    pub fn toggle_fullscreen(&mut self) -> bool {
        std::mem::swap(&mut self.geometry, &mut self.previous_geometry);
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    pub fn reshape(&mut self, width: i32, height: i32) {
        self.geometry.width = width;
        self.geometry.height = height;
    }
}

#[derive(Debug)]
pub struct WindowBase {
    identity: Rc<RefCell<WindowIdentity>>,
    keys: KeyBindingTable,
}

impl WindowBase {
    /// Registers fullscreen and run-control bindings; windows add their own on top.
    pub fn new(
        id: WindowId,
        name: impl Into<String>,
        position: WindowPosition,
        size: WindowSize,
        shared: &Arc<SharedContext>,
    ) -> KeyBindingResult<Self> {
        let identity = Rc::new(RefCell::new(WindowIdentity::new(
            id,
            name,
            WindowGeometry::from_parts(position, size),
        )));
        let mut keys = KeyBindingTable::new();

        {
            let identity = identity.clone();
            keys.register('f', "f - toggles fullscreen", move || {
                let mut identity = identity.borrow_mut();
                let fullscreen = identity.toggle_fullscreen();
                tracing::info!(window = identity.name.as_str(), fullscreen, "toggled fullscreen");
            })?;
        }
        {
            let shared = shared.clone();
            keys.register('p', "p - pauses/resumes processing", move || {
                let paused = shared.toggle_pause();
                tracing::info!(paused, "toggled pause");
            })?;
        }
        {
            let shared = shared.clone();
            keys.register('s', "s - toggles single-step mode", move || {
                let single_step = shared.toggle_single_step();
                tracing::info!(single_step, "toggled single-step mode");
            })?;
        }
        for (key, description) in [('q', "q - quits"), (ESCAPE_KEY, "Esc - quits")] {
            let shared = shared.clone();
            keys.register(key, description, move || {
                tracing::info!("quit requested from keyboard");
                shared.quit();
            })?;
        }

        Ok(Self { identity, keys })
    }

    pub fn id(&self) -> WindowId {
        self.identity.borrow().id
    }

    pub fn name(&self) -> String {
        self.identity.borrow().name.clone()
    }

    pub fn identity(&self) -> Ref<'_, WindowIdentity> {
        self.identity.borrow()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.identity.borrow().fullscreen
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.identity.borrow().geometry
    }

    pub fn reshape(&self, width: i32, height: i32) {
        self.identity.borrow_mut().reshape(width, height);
    }

    pub fn toggle_fullscreen(&self) -> bool {
        self.identity.borrow_mut().toggle_fullscreen()
    }

    pub fn keys(&self) -> &KeyBindingTable {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyBindingTable {
        &mut self.keys
    }
}
