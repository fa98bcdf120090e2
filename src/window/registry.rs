use std::collections::BTreeMap;
use std::rc::Rc;

use super::{Window, WindowId};

#[derive(Default)]
pub struct WindowRegistry {
    last_id: u32,
    windows: BTreeMap<WindowId, Rc<dyn Window>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids start at 1 and are never reused within the registry's lifetime.
    pub fn allocate_id(&mut self) -> WindowId {
        self.last_id += 1;
        WindowId(self.last_id)
    }

    pub fn insert(&mut self, window: Rc<dyn Window>) {
        let id = window.id();
        if self.windows.insert(id, window).is_some() {
            tracing::warn!(window_id = %id, "replaced an already registered window");
        }
    }

    pub fn remove(&mut self, id: WindowId) -> Option<Rc<dyn Window>> {
        self.windows.remove(&id)
    }

    /// Returns a strong handle so callers can release the registry borrow before dispatching.
    pub fn get(&self, id: WindowId) -> Option<Rc<dyn Window>> {
        self.windows.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl std::fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("last_id", &self.last_id)
            .field("ids", &self.ids())
            .finish()
    }
}
