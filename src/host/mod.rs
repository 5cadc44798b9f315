//! Host boundary for the video view
//!
//! The widget never touches a window system directly. Everything it needs
//! from the surrounding application (placement of the render container,
//! window flags, requested orientation, sensors, audio focus, network state
//! and the on-screen controller) is expressed by the traits in this module.

pub mod headless;

pub use headless::{
    FixedNetworkPolicy, HeadlessHost, HeadlessRenderSurface, LoggingAudioFocus,
    LoggingOrientationSensor, Placement,
};

use crate::player::{PlayState, ScreenMode, ScreenScaleMode};
use serde::{Deserialize, Serialize};

/// Identifier of a render surface created by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Identifier of a widget's render container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Kind of render surface requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Texture,
    Surface,
}

/// Corner a tiny window is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopStart,
    TopEnd,
    BottomStart,
    #[default]
    BottomEnd,
}

/// Orientation the host window is asked to adopt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostOrientation {
    #[default]
    Unspecified,
    Portrait,
    Landscape,
    ReverseLandscape,
}

/// Active network connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    None,
    Wifi,
    Cellular,
    Other,
}

/// Window/view system the render container is placed into
pub trait SurfaceHost: Send {
    /// Whether the top-level window surface can be resolved
    fn has_window(&self) -> bool;

    /// Whether the content surface (tiny window parent) can be resolved
    fn has_content(&self) -> bool;

    /// Host width in pixels
    fn screen_width(&self) -> u32;

    /// Whether the widget is currently visible to the user
    fn is_visible(&self) -> bool;

    /// Keep the display awake while set
    fn set_keep_screen_on(&mut self, keep_on: bool);

    /// Insert the overlay suppressing system chrome (status/navigation bars)
    fn insert_chrome_overlay(&mut self, view: ViewHandle);

    /// Remove the chrome suppressing overlay
    fn remove_chrome_overlay(&mut self, view: ViewHandle);

    /// Set or clear the window's fullscreen flags
    fn set_fullscreen_flags(&mut self, fullscreen: bool);

    /// Place the container back into the widget's own parent
    fn attach_normal(&mut self, view: ViewHandle);

    /// Place the container on the top-level window surface
    fn attach_fullscreen(&mut self, view: ViewHandle);

    /// Place the container in a floating window
    fn attach_tiny(&mut self, view: ViewHandle, width: u32, height: u32, corner: Corner);

    /// Remove the container from whichever parent holds it
    fn detach(&mut self, view: ViewHandle);

    /// Orientation currently requested from the window
    fn requested_orientation(&self) -> HostOrientation;

    /// Ask the window to adopt an orientation
    fn set_requested_orientation(&mut self, orientation: HostOrientation);

    /// Create a render surface inside the widget's container
    fn create_render_surface(&mut self, view: ViewHandle, kind: SurfaceKind) -> Box<dyn RenderSurface>;

    /// Remove a render surface from the widget's container
    fn remove_render_surface(&mut self, view: ViewHandle, surface: SurfaceId);
}

/// Surface decoded frames are drawn into
pub trait RenderSurface: Send {
    fn id(&self) -> SurfaceId;

    fn set_scale_mode(&mut self, mode: ScreenScaleMode);

    fn set_video_size(&mut self, width: u32, height: u32);

    /// Rotate the picture by `degrees`
    fn set_video_rotation(&mut self, degrees: i32);

    /// Mirror the picture horizontally
    fn set_mirrored(&mut self, mirrored: bool);

    fn release(&mut self);
}

/// Device orientation sensor; samples are posted to the widget event queue
pub trait OrientationSensor: Send {
    fn enable(&mut self);
    fn disable(&mut self);
}

/// Exclusive audio focus; changes are posted to the widget event queue
pub trait AudioFocusArbiter: Send {
    fn request(&mut self);
    fn abandon(&mut self);
}

/// Network state consulted before playing network sources
pub trait NetworkPolicy: Send {
    fn connection(&self) -> ConnectionKind;
}

/// On-screen controller attached to the widget
pub trait ControlSurface: Send {
    fn on_play_state_changed(&mut self, state: PlayState);

    fn on_player_mode_changed(&mut self, mode: ScreenMode);

    /// Show the status overlay (e.g. "playing over cellular, continue?")
    fn show_status_view(&mut self);

    fn hide_status_view(&mut self);

    /// Give the controller a chance to consume a back press
    fn on_back_pressed(&mut self) -> bool {
        false
    }
}
