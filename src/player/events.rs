//! Widget event queue
//!
//! Engine callbacks, orientation samples and host notifications are all
//! producers into one FIFO queue per widget. The widget is the single
//! consumer and drains the queue on its own thread, so no transition ever
//! runs concurrently with another.

use crate::engine::EngineEvent;
use crossbeam_channel::Sender;
use log::trace;

/// Audio focus change reported by the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFocusChange {
    /// Focus granted (again)
    Gained,

    /// Focus lost for an unknown duration
    Lost,

    /// Focus lost briefly
    LostTransient,

    /// Another stream plays over us at low volume
    Ducked,
}

/// Event delivered to a widget
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Engine callback from the engine of `generation`
    Engine { generation: u64, event: EngineEvent },

    /// Raw orientation sample in degrees
    Orientation(i32),

    /// Host window gained or lost focus
    WindowFocus(bool),

    /// Host shows or hides the widget
    WindowVisibility(bool),

    /// Audio focus change
    AudioFocus(AudioFocusChange),
}

/// Cloneable producer handle for host-side callbacks
#[derive(Debug, Clone)]
pub struct ViewEventSender {
    tx: Sender<ViewEvent>,
}

impl ViewEventSender {
    pub(crate) fn new(tx: Sender<ViewEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: ViewEvent) {
        if let Err(e) = self.tx.send(event) {
            trace!("View event dropped, widget is gone: {:?}", e.into_inner());
        }
    }

    pub fn orientation(&self, angle: i32) {
        self.send(ViewEvent::Orientation(angle));
    }

    pub fn window_focus(&self, has_focus: bool) {
        self.send(ViewEvent::WindowFocus(has_focus));
    }

    pub fn window_visibility(&self, visible: bool) {
        self.send(ViewEvent::WindowVisibility(visible));
    }

    pub fn audio_focus(&self, change: AudioFocusChange) {
        self.send(ViewEvent::AudioFocus(change));
    }
}
