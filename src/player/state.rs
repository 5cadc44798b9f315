//! Playback state machine
//!
//! Pure mapping from engine callbacks to [`PlayState`]. The machine never
//! touches the engine or host itself: every transition is returned together
//! with the side effects the lifecycle coordinator has to carry out.

use crate::engine::{EngineEvent, InfoKind};
use crate::player::PlayState;
use log::debug;

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Drop the keep-awake assertion
    ClearKeepAwake,

    /// Zero the cached playback position
    ResetPosition,

    /// Persist a progress of zero for the bound source
    PersistZeroProgress,

    /// Pause right away if the host surface is not visible
    PauseIfHidden,

    /// Seek to the cached position if it is non-zero
    SeekToCachedPosition,

    /// Rotate the rendered picture
    RotateVideo(i32),

    /// Resize the rendered picture
    ResizeVideo { width: u32, height: u32 },
}

/// Result of feeding one engine callback through the machine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    /// New state, if the callback changes it
    pub state: Option<PlayState>,

    /// Effects to apply after the state change was announced
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: PlayState) -> Self {
        Self {
            state: Some(state),
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn effect_only(effect: Effect) -> Self {
        Self {
            state: None,
            effects: vec![effect],
        }
    }
}

/// Owner of the current [`PlayState`]
#[derive(Debug, Default)]
pub struct PlaybackStateMachine {
    state: PlayState,
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Force a state (commands such as start/pause/release); returns the previous one
    pub fn set(&mut self, state: PlayState) -> PlayState {
        let previous = self.state;
        self.state = state;
        if previous != state {
            debug!("Play state {:?} -> {:?}", previous, state);
        }
        previous
    }

    /// Map an engine callback to a transition and apply its state change
    pub fn on_engine_event(&mut self, event: &EngineEvent) -> Transition {
        let transition = match event {
            EngineEvent::Error { .. } => Transition::to(PlayState::Error),
            EngineEvent::Completion => Transition::to(PlayState::Completed)
                .with(Effect::ClearKeepAwake)
                .with(Effect::ResetPosition)
                .with(Effect::PersistZeroProgress),
            EngineEvent::Info { kind, extra } => match kind {
                InfoKind::BufferingStart => Transition::to(PlayState::Buffering),
                InfoKind::BufferingEnd => Transition::to(PlayState::Buffered),
                InfoKind::RenderingStart => {
                    Transition::to(PlayState::Playing).with(Effect::PauseIfHidden)
                }
                InfoKind::RotationChanged => Transition::effect_only(Effect::RotateVideo(*extra)),
                InfoKind::Other(_) => Transition::default(),
            },
            EngineEvent::Prepared => {
                Transition::to(PlayState::Prepared).with(Effect::SeekToCachedPosition)
            }
            EngineEvent::VideoSizeChanged { width, height } => {
                Transition::effect_only(Effect::ResizeVideo {
                    width: *width,
                    height: *height,
                })
            }
        };

        if let Some(state) = transition.state {
            self.set(state);
        }
        transition
    }

    /// True iff an engine exists and the state is not Error, Idle, Preparing or Completed
    pub fn is_in_playback_state(&self, has_engine: bool) -> bool {
        has_engine
            && !matches!(
                self.state,
                PlayState::Error | PlayState::Idle | PlayState::Preparing | PlayState::Completed
            )
    }

    /// True iff there is no engine or the state is Idle
    pub fn is_in_idle_state(&self, has_engine: bool) -> bool {
        !has_engine || self.state == PlayState::Idle
    }
}
