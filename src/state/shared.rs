//! The single lock guarding every visualization buffer and the run-control flags.
//!
//! Producers and the render loop share one [`SharedContext`]. All canvas state is
//! stored inside it as typed slots, so the only way to read or replace a buffer is
//! through a [`SyncScope`], which holds the lock until it is dropped. Acquiring a
//! second scope on the same thread while one is alive deadlocks; callers that need
//! several related mutations use the `*_in(scope, ..)` forms instead.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::run_control::RunControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

#[derive(Default)]
struct SharedData {
    run_control: RunControl,
    slots: HashMap<SlotId, Box<dyn Any + Send>>,
    next_slot: u64,
}

#[derive(Default)]
pub struct SharedContext {
    data: Mutex<SharedData>,
}

impl SharedContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn acquire_scoped(&self) -> SyncScope<'_> {
        let data = self.data.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("shared visualization lock was poisoned by a panicking holder; recovering");
            poisoned.into_inner()
        });
        SyncScope { owner: self, data }
    }

    pub fn insert_slot<S: Send + 'static>(&self, state: S) -> SlotId {
        self.acquire_scoped().insert_slot(state)
    }

    pub fn remove_slot(&self, id: SlotId) {
        self.acquire_scoped().remove_slot(id);
    }

    pub fn quit(&self) {
        self.acquire_scoped().run_control_mut().quit();
    }

    pub fn is_quit(&self) -> bool {
        self.acquire_scoped().run_control().is_quit()
    }

    pub fn pause(&self) {
        self.acquire_scoped().run_control_mut().pause();
    }

    pub fn resume(&self) {
        self.acquire_scoped().run_control_mut().resume();
    }

    pub fn toggle_pause(&self) -> bool {
        self.acquire_scoped().run_control_mut().toggle_pause()
    }

    pub fn is_paused(&self) -> bool {
        self.acquire_scoped().run_control().is_paused()
    }

    pub fn toggle_single_step(&self) -> bool {
        self.acquire_scoped().run_control_mut().toggle_single_step()
    }

    pub fn is_single_step_on(&self) -> bool {
        self.acquire_scoped().run_control().is_single_step_on()
    }

    pub fn run_control(&self) -> RunControl {
        *self.acquire_scoped().run_control()
    }
}

impl std::fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.data.try_lock() {
            Ok(data) => f
                .debug_struct("SharedContext")
                .field("run_control", &data.run_control)
                .field("slots", &data.slots.len())
                .finish(),
            Err(_) => f.write_str("SharedContext { <locked> }"),
        }
    }
}

/// Scoped acquisition of the shared lock; released on every exit path by `Drop`.
pub struct SyncScope<'a> {
    owner: &'a SharedContext,
    data: MutexGuard<'a, SharedData>,
}

impl SyncScope<'_> {
    pub fn belongs_to(&self, shared: &SharedContext) -> bool {
        std::ptr::eq(self.owner, shared)
    }

    pub fn run_control(&self) -> &RunControl {
        &self.data.run_control
    }

    pub fn run_control_mut(&mut self) -> &mut RunControl {
        &mut self.data.run_control
    }

    pub fn insert_slot<S: Send + 'static>(&mut self, state: S) -> SlotId {
        let id = SlotId(self.data.next_slot);
        self.data.next_slot += 1;
        self.data.slots.insert(id, Box::new(state));
        id
    }

    pub fn remove_slot(&mut self, id: SlotId) {
        self.data.slots.remove(&id);
    }

    pub fn slot<S: 'static>(&self, id: SlotId) -> Option<&S> {
        self.data.slots.get(&id)?.downcast_ref::<S>()
    }

    pub fn slot_mut<S: 'static>(&mut self, id: SlotId) -> Option<&mut S> {
        self.data.slots.get_mut(&id)?.downcast_mut::<S>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn pause_then_is_paused_reports_true() {
        let shared = SharedContext::new();
        shared.pause();
        assert!(shared.is_paused());
        assert!(!shared.is_quit());
    }

    #[test]
    fn quit_set_on_one_thread_is_seen_by_polling_thread() {
        let shared = SharedContext::new();
        let poller = {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut polls = 0_u64;
                while !shared.is_quit() {
                    polls += 1;
                    thread::yield_now();
                }
                polls
            })
        };

        shared.quit();
        poller.join().expect("poller should exit once quit is set");
    }

    #[test]
    fn scope_is_released_on_early_return() {
        fn bump_if_even(shared: &SharedContext, slot: SlotId) -> bool {
            let mut scope = shared.acquire_scoped();
            let Some(value) = scope.slot_mut::<u32>(slot) else {
                return false;
            };
            if *value % 2 == 1 {
                return false;
            }
            *value += 1;
            true
        }

        let shared = SharedContext::new();
        let slot = shared.insert_slot(2_u32);
        assert!(bump_if_even(&shared, slot));
        assert!(!bump_if_even(&shared, slot));
        assert!(shared.data.try_lock().is_ok());
        assert_eq!(shared.acquire_scoped().slot::<u32>(slot), Some(&3));
    }

    #[test]
    fn slots_are_typed_and_removable() {
        let shared = SharedContext::new();
        let numbers = shared.insert_slot(vec![1_u8, 2, 3]);
        let label = shared.insert_slot(String::from("batch"));
        assert_ne!(numbers, label);

        {
            let scope = shared.acquire_scoped();
            assert_eq!(scope.slot::<Vec<u8>>(numbers).map(Vec::len), Some(3));
            assert!(scope.slot::<String>(numbers).is_none());
            assert_eq!(scope.slot::<String>(label).map(String::as_str), Some("batch"));
        }

        shared.remove_slot(numbers);
        assert!(shared.acquire_scoped().slot::<Vec<u8>>(numbers).is_none());

        let other = SharedContext::new();
        assert!(shared.acquire_scoped().belongs_to(&shared));
        assert!(!other.acquire_scoped().belongs_to(&shared));
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let shared = SharedContext::new();
        let panicking = {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut scope = shared.acquire_scoped();
                scope.run_control_mut().pause();
                panic!("producer bug while holding the lock");
            })
        };
        assert!(panicking.join().is_err());

        assert!(shared.is_paused());
        shared.quit();
        assert!(shared.is_quit());
    }
}
