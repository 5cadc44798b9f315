//! Headless collaborators
//!
//! Log-only implementations of the host traits, used by the demo binary to
//! drive a widget without a window system.

use crate::host::{
    AudioFocusArbiter, ConnectionKind, Corner, HostOrientation, NetworkPolicy,
    OrientationSensor, RenderSurface, SurfaceHost, SurfaceId, SurfaceKind, ViewHandle,
};
use crate::player::ScreenScaleMode;
use log::{debug, info};

/// Where the headless host currently holds the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Detached,
    Normal,
    Fullscreen,
    Tiny { width: u32, height: u32 },
}

/// Window-less host that records placements and logs every request
#[derive(Debug)]
pub struct HeadlessHost {
    screen_width: u32,
    visible: bool,
    keep_screen_on: bool,
    fullscreen_flags: bool,
    orientation: HostOrientation,
    placement: Placement,
    next_surface: u64,
}

impl HeadlessHost {
    pub fn new(screen_width: u32) -> Self {
        Self {
            screen_width,
            visible: true,
            keep_screen_on: false,
            fullscreen_flags: false,
            orientation: HostOrientation::Unspecified,
            placement: Placement::Normal,
            next_surface: 1,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn keep_screen_on(&self) -> bool {
        self.keep_screen_on
    }

    pub fn fullscreen_flags(&self) -> bool {
        self.fullscreen_flags
    }
}

impl SurfaceHost for HeadlessHost {
    fn has_window(&self) -> bool {
        true
    }

    fn has_content(&self) -> bool {
        true
    }

    fn screen_width(&self) -> u32 {
        self.screen_width
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_keep_screen_on(&mut self, keep_on: bool) {
        if self.keep_screen_on != keep_on {
            debug!("Keep screen on: {}", keep_on);
        }
        self.keep_screen_on = keep_on;
    }

    fn insert_chrome_overlay(&mut self, view: ViewHandle) {
        debug!("Chrome overlay inserted for view {}", view.0);
    }

    fn remove_chrome_overlay(&mut self, view: ViewHandle) {
        debug!("Chrome overlay removed for view {}", view.0);
    }

    fn set_fullscreen_flags(&mut self, fullscreen: bool) {
        self.fullscreen_flags = fullscreen;
    }

    fn attach_normal(&mut self, view: ViewHandle) {
        info!("View {} attached to its normal parent", view.0);
        self.placement = Placement::Normal;
    }

    fn attach_fullscreen(&mut self, view: ViewHandle) {
        info!("View {} attached to the window surface", view.0);
        self.placement = Placement::Fullscreen;
    }

    fn attach_tiny(&mut self, view: ViewHandle, width: u32, height: u32, corner: Corner) {
        info!("View {} floating {}x{} at {:?}", view.0, width, height, corner);
        self.placement = Placement::Tiny { width, height };
    }

    fn detach(&mut self, view: ViewHandle) {
        debug!("View {} detached", view.0);
        self.placement = Placement::Detached;
    }

    fn requested_orientation(&self) -> HostOrientation {
        self.orientation
    }

    fn set_requested_orientation(&mut self, orientation: HostOrientation) {
        info!("Host orientation requested: {:?}", orientation);
        self.orientation = orientation;
    }

    fn create_render_surface(&mut self, view: ViewHandle, kind: SurfaceKind) -> Box<dyn RenderSurface> {
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        debug!("Render surface {} ({:?}) created for view {}", id.0, kind, view.0);
        Box::new(HeadlessRenderSurface::new(id))
    }

    fn remove_render_surface(&mut self, view: ViewHandle, surface: SurfaceId) {
        debug!("Render surface {} removed from view {}", surface.0, view.0);
    }
}

/// Render surface that only remembers its parameters
#[derive(Debug)]
pub struct HeadlessRenderSurface {
    id: SurfaceId,
    scale: ScreenScaleMode,
    video_size: (u32, u32),
    rotation: i32,
    mirrored: bool,
}

impl HeadlessRenderSurface {
    pub fn new(id: SurfaceId) -> Self {
        Self {
            id,
            scale: ScreenScaleMode::Default,
            video_size: (0, 0),
            rotation: 0,
            mirrored: false,
        }
    }
}

impl RenderSurface for HeadlessRenderSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn set_scale_mode(&mut self, mode: ScreenScaleMode) {
        self.scale = mode;
    }

    fn set_video_size(&mut self, width: u32, height: u32) {
        self.video_size = (width, height);
        debug!("Surface {} video size {}x{} ({:?})", self.id.0, width, height, self.scale);
    }

    fn set_video_rotation(&mut self, degrees: i32) {
        self.rotation = degrees;
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    fn release(&mut self) {
        debug!(
            "Surface {} released (rotation {}, mirrored {})",
            self.id.0, self.rotation, self.mirrored
        );
    }
}

/// Sensor that logs enable/disable; samples are fed by the caller
#[derive(Debug, Default)]
pub struct LoggingOrientationSensor {
    enabled: bool,
}

impl LoggingOrientationSensor {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl OrientationSensor for LoggingOrientationSensor {
    fn enable(&mut self) {
        self.enabled = true;
        info!("Orientation sensor enabled");
    }

    fn disable(&mut self) {
        self.enabled = false;
        info!("Orientation sensor disabled");
    }
}

/// Audio focus arbiter that always grants focus
#[derive(Debug, Default)]
pub struct LoggingAudioFocus {
    held: bool,
}

impl AudioFocusArbiter for LoggingAudioFocus {
    fn request(&mut self) {
        if !self.held {
            debug!("Audio focus acquired");
        }
        self.held = true;
    }

    fn abandon(&mut self) {
        if self.held {
            debug!("Audio focus abandoned");
        }
        self.held = false;
    }
}

/// Network policy reporting a fixed connection
#[derive(Debug, Clone, Copy)]
pub struct FixedNetworkPolicy(pub ConnectionKind);

impl NetworkPolicy for FixedNetworkPolicy {
    fn connection(&self) -> ConnectionKind {
        self.0
    }
}
