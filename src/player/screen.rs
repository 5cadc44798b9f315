//! Screen mode controller
//!
//! Owns the [`ScreenMode`] of a widget and performs the host side of every
//! transition: moving the render container between its normal parent, the
//! top-level window and a floating tiny window, toggling window flags, and
//! switching the orientation sensor on and off.
//!
//! Mode changes are reported through return values; announcing them to the
//! control surface and listeners is the lifecycle coordinator's job.

use crate::host::{Corner, HostOrientation, OrientationSensor, SurfaceHost, ViewHandle};
use crate::player::orientation::{OrientationContext, OrientationDecision};
use crate::player::ScreenMode;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Single-shot timer polled by its owner
#[derive(Debug, Default)]
pub struct DeferredTimer {
    deadline: Option<Instant>,
}

impl DeferredTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)arm the timer to fire `delay` after `now`
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the timer if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Normal / fullscreen / tiny placement of one widget
pub struct ScreenModeController {
    view: ViewHandle,
    host: Box<dyn SurfaceHost>,
    sensor: Option<Box<dyn OrientationSensor>>,
    mode: ScreenMode,

    /// User preference to follow device orientation
    follow_orientation: bool,

    /// Whether the sensor is currently enabled
    tracking: bool,

    /// Requested tiny window size; a zero side is derived
    tiny_size: (u32, u32),
    tiny_corner: Corner,

    focus_timer: DeferredTimer,
    focus_delay: Duration,
}

impl ScreenModeController {
    pub fn new(
        view: ViewHandle,
        host: Box<dyn SurfaceHost>,
        sensor: Option<Box<dyn OrientationSensor>>,
        follow_orientation: bool,
        focus_delay: Duration,
    ) -> Self {
        Self {
            view,
            host,
            sensor,
            mode: ScreenMode::Normal,
            follow_orientation,
            tracking: false,
            tiny_size: (0, 0),
            tiny_corner: Corner::default(),
            focus_timer: DeferredTimer::new(),
            focus_delay,
        }
    }

    pub fn mode(&self) -> ScreenMode {
        self.mode
    }

    pub fn is_fullscreen(&self) -> bool {
        self.mode == ScreenMode::Fullscreen
    }

    pub fn is_tiny(&self) -> bool {
        self.mode == ScreenMode::Tiny
    }

    pub fn view(&self) -> ViewHandle {
        self.view
    }

    pub fn host(&self) -> &dyn SurfaceHost {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn SurfaceHost {
        self.host.as_mut()
    }

    /// Replace the orientation sensor; the old one is disabled first
    pub fn set_sensor(&mut self, sensor: Option<Box<dyn OrientationSensor>>) {
        let was_tracking = self.tracking;
        self.disable_tracking();
        self.sensor = sensor;
        if was_tracking {
            self.enable_tracking();
        }
    }

    pub fn follow_orientation(&self) -> bool {
        self.follow_orientation
    }

    pub fn set_follow_orientation(&mut self, follow: bool) {
        self.follow_orientation = follow;
    }

    pub fn set_tiny_size(&mut self, width: u32, height: u32) {
        self.tiny_size = (width, height);
    }

    pub fn set_tiny_corner(&mut self, corner: Corner) {
        self.tiny_corner = corner;
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn is_focus_timer_armed(&self) -> bool {
        self.focus_timer.is_armed()
    }

    pub fn enable_tracking(&mut self) {
        if self.tracking {
            return;
        }
        if let Some(sensor) = self.sensor.as_mut() {
            sensor.enable();
        }
        self.tracking = true;
        debug!("Orientation tracking enabled for view {}", self.view.0);
    }

    pub fn disable_tracking(&mut self) {
        if !self.tracking {
            return;
        }
        if let Some(sensor) = self.sensor.as_mut() {
            sensor.disable();
        }
        self.tracking = false;
        debug!("Orientation tracking disabled for view {}", self.view.0);
    }

    /// Whether a raw orientation sample should reach the policy
    pub fn accepts_orientation_samples(&self) -> bool {
        self.tracking && self.host.has_window()
    }

    /// Snapshot for the orientation policy
    pub fn orientation_context(&self, locked: bool) -> OrientationContext {
        OrientationContext {
            locked,
            follow_orientation: self.follow_orientation,
            is_fullscreen: self.is_fullscreen(),
            host_orientation: self.host.requested_orientation(),
        }
    }

    /// Returns whether the mode changed
    pub fn enter_fullscreen(&mut self) -> bool {
        if self.is_fullscreen() || !self.host.has_window() {
            return false;
        }
        if self.is_tiny() {
            self.exit_tiny();
        }
        self.focus_timer.cancel();

        self.host.insert_chrome_overlay(self.view);
        self.host.set_fullscreen_flags(true);
        self.host.detach(self.view);
        self.host.attach_fullscreen(self.view);
        self.enable_tracking();
        self.mode = ScreenMode::Fullscreen;
        info!("View {} entered fullscreen", self.view.0);
        true
    }

    /// Returns whether the mode changed
    pub fn exit_fullscreen(&mut self) -> bool {
        if !self.is_fullscreen() || !self.host.has_window() {
            return false;
        }
        self.focus_timer.cancel();

        if !self.follow_orientation {
            self.disable_tracking();
        }
        self.host.remove_chrome_overlay(self.view);
        self.host.set_fullscreen_flags(false);
        self.host.detach(self.view);
        self.host.attach_normal(self.view);
        self.mode = ScreenMode::Normal;
        info!("View {} left fullscreen", self.view.0);
        true
    }

    /// Returns whether the mode changed
    pub fn enter_tiny(&mut self) -> bool {
        if self.is_tiny() || !self.host.has_content() {
            return false;
        }
        if self.is_fullscreen() {
            self.exit_fullscreen();
        }
        self.focus_timer.cancel();

        self.disable_tracking();
        let (width, height) = self.tiny_window_size();
        self.host.detach(self.view);
        self.host.attach_tiny(self.view, width, height, self.tiny_corner);
        self.mode = ScreenMode::Tiny;
        info!("View {} entered tiny window {}x{}", self.view.0, width, height);
        true
    }

    /// Returns whether the mode changed
    pub fn exit_tiny(&mut self) -> bool {
        if !self.is_tiny() || !self.host.has_content() {
            return false;
        }
        self.focus_timer.cancel();

        self.host.detach(self.view);
        self.host.attach_normal(self.view);
        if self.follow_orientation {
            self.enable_tracking();
        }
        self.mode = ScreenMode::Normal;
        info!("View {} left tiny window", self.view.0);
        true
    }

    /// Configured tiny size; width defaults to half the host width, height to 16:9 of the width
    pub fn tiny_window_size(&self) -> (u32, u32) {
        let (width, height) = self.tiny_size;
        let width = if width > 0 { width } else { self.host.screen_width() / 2 };
        let height = if height > 0 { height } else { width * 9 / 16 };
        (width, height)
    }

    /// Carry out an orientation decision; returns the new mode if it changed
    pub fn apply_orientation(&mut self, decision: OrientationDecision) -> Option<ScreenMode> {
        match decision {
            OrientationDecision::ExitToPortrait => {
                self.host.set_requested_orientation(HostOrientation::Portrait);
                self.exit_fullscreen().then_some(ScreenMode::Normal)
            }
            OrientationDecision::EnterLandscape(orientation) => {
                let changed = !self.is_fullscreen() && self.enter_fullscreen();
                self.host.set_requested_orientation(orientation);
                changed.then_some(ScreenMode::Fullscreen)
            }
        }
    }

    /// Host window gained or lost input focus
    ///
    /// Tracking is only touched while the widget is in a playback state and
    /// either follows orientation or is fullscreen.
    pub fn on_window_focus_changed(&mut self, has_focus: bool, in_playback: bool, now: Instant) {
        if has_focus && self.is_fullscreen() {
            self.host.set_fullscreen_flags(true);
        }

        if in_playback && (self.follow_orientation || self.is_fullscreen()) {
            if has_focus {
                self.focus_timer.arm(now, self.focus_delay);
            } else {
                self.focus_timer.cancel();
                self.disable_tracking();
            }
        }
    }

    /// Fire due timers; returns whether tracking was re-enabled
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        if !self.focus_timer.take_due(now) {
            return false;
        }
        self.enable_tracking();
        true
    }

    /// Drop all deferred work and stop tracking (widget teardown)
    pub fn reset(&mut self) {
        self.focus_timer.cancel();
        self.disable_tracking();
    }
}
