//! Active instance registry
//!
//! Shared service that knows every widget currently holding an engine, so a
//! widget starting playback can stop all the others. It also carries the
//! process-wide permission to play over a cellular connection.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Weak;
use log::debug;

/// Identity of a registered widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// Something the registry can tear down
pub trait Releasable: Send {
    fn release(&mut self);
}

type Handle = Weak<Mutex<dyn Releasable>>;

/// Registry of active widgets
#[derive(Default)]
pub struct ActiveInstanceRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(InstanceId, Handle)>>,
    play_on_mobile_network: AtomicBool,
}

impl ActiveInstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh instance id
    pub fn allocate_id(&self) -> InstanceId {
        InstanceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Register a widget; registering an id twice keeps the first entry
    pub fn register(&self, id: InstanceId, handle: Handle) {
        let mut entries = self.entries.lock();
        if entries.iter().any(|(existing, _)| *existing == id) {
            return;
        }
        entries.push((id, handle));
        debug!("Instance {} registered ({} active)", id.0, entries.len());
    }

    /// Remove a widget; unknown ids are ignored
    pub fn unregister(&self, id: InstanceId) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        if entries.len() != before {
            debug!("Instance {} unregistered ({} active)", id.0, entries.len());
        }
    }

    /// Release every registered widget except `keep`
    pub fn release_all_except(&self, keep: InstanceId) {
        let others: Vec<(InstanceId, Handle)> = {
            let mut entries = self.entries.lock();
            let (kept, others) = entries.drain(..).partition(|(id, _)| *id == keep);
            *entries = kept;
            others
        };
        // Released widgets unregister themselves, so the lock must be free here
        Self::release_handles(others);
    }

    /// Release every registered widget
    pub fn release_all(&self) {
        let all: Vec<(InstanceId, Handle)> = self.entries.lock().drain(..).collect();
        Self::release_handles(all);
    }

    fn release_handles(handles: Vec<(InstanceId, Handle)>) {
        for (id, handle) in handles {
            if let Some(instance) = handle.upgrade() {
                debug!("Releasing instance {}", id.0);
                instance.lock().release();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.entries.lock().iter().any(|(existing, _)| *existing == id)
    }

    pub fn set_play_on_mobile_network(&self, allowed: bool) {
        self.play_on_mobile_network.store(allowed, Ordering::Relaxed);
    }

    pub fn play_on_mobile_network(&self) -> bool {
        self.play_on_mobile_network.load(Ordering::Relaxed)
    }
}
