//! State change listener fan-out
//!
//! Listeners form an ordered multiset: notification order is insertion
//! order, the same listener may be registered more than once, and removal
//! takes out the first entry with the same identity.

use crate::player::{PlayState, ScreenMode};
use std::sync::Arc;

/// Observer of widget state changes
pub trait StateChangeListener: Send + Sync {
    fn on_play_state_changed(&self, _state: PlayState) {}

    fn on_player_mode_changed(&self, _mode: ScreenMode) {}
}

/// A single state change, as seen by closure listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    PlayState(PlayState),
    PlayerMode(ScreenMode),
}

/// Adapter turning a closure into a listener
pub struct FnListener<F>(F);

impl<F> StateChangeListener for FnListener<F>
where
    F: Fn(StateChange) + Send + Sync,
{
    fn on_play_state_changed(&self, state: PlayState) {
        (self.0)(StateChange::PlayState(state));
    }

    fn on_player_mode_changed(&self, mode: ScreenMode) {
        (self.0)(StateChange::PlayerMode(mode));
    }
}

/// Wrap a closure as a shareable listener
pub fn listener_fn<F>(callback: F) -> Arc<dyn StateChangeListener>
where
    F: Fn(StateChange) + Send + Sync + 'static,
{
    Arc::new(FnListener(callback))
}

/// Ordered listener collection
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn StateChangeListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; duplicates are kept
    pub fn add(&mut self, listener: Arc<dyn StateChangeListener>) {
        self.listeners.push(listener);
    }

    /// Remove the first entry that is the same listener; returns whether one was found
    pub fn remove(&mut self, listener: &Arc<dyn StateChangeListener>) -> bool {
        let target = Arc::as_ptr(listener) as *const ();
        match self
            .listeners
            .iter()
            .position(|l| Arc::as_ptr(l) as *const () == target)
        {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace every listener with a single one
    pub fn set(&mut self, listener: Arc<dyn StateChangeListener>) {
        self.listeners.clear();
        self.listeners.push(listener);
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn notify_play_state(&self, state: PlayState) {
        for listener in &self.listeners {
            listener.on_play_state_changed(state);
        }
    }

    pub fn notify_player_mode(&self, mode: ScreenMode) {
        for listener in &self.listeners {
            listener.on_player_mode_changed(mode);
        }
    }
}
