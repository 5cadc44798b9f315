//! Orientation policy
//!
//! Raw sensor angles are classified into buckets using three disjoint
//! windows; everything else is a dead zone. A bucket change may ask the
//! screen controller to enter or leave fullscreen.
//!
//! The guards are asymmetric. Returning to portrait checks whether the
//! widget is fullscreen; entering a landscape variant checks the orientation
//! the host has been asked for.

use crate::host::HostOrientation;
use crate::player::OrientationBucket;
use log::{debug, trace};

/// Portrait window: [340, 360) and [0, 20)
const PORTRAIT_UPPER_START: i32 = 340;
const PORTRAIT_LOWER_END: i32 = 20;

/// Landscape window: [260, 280]
const LANDSCAPE_RANGE: (i32, i32) = (260, 280);

/// Reverse landscape window: [70, 90]
const REVERSE_LANDSCAPE_RANGE: (i32, i32) = (70, 90);

/// Widget state the policy needs to decide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationContext {
    /// User lock: suppresses every orientation driven change
    pub locked: bool,

    /// User preference to follow device orientation
    pub follow_orientation: bool,

    pub is_fullscreen: bool,

    /// Orientation the host window was last asked to adopt
    pub host_orientation: HostOrientation,
}

/// Screen change requested by a bucket change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationDecision {
    /// Ask the host for portrait and leave fullscreen
    ExitToPortrait,

    /// Enter fullscreen if needed, then ask the host for this orientation
    EnterLandscape(HostOrientation),
}

/// Tracks the last observed bucket and decides on bucket changes
#[derive(Debug, Default)]
pub struct OrientationPolicy {
    current: OrientationBucket,
}

impl OrientationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed bucket
    pub fn current(&self) -> OrientationBucket {
        self.current
    }

    /// Classify an angle; `None` inside the dead zone or for unknown (negative) samples
    pub fn classify(angle: i32) -> Option<OrientationBucket> {
        if angle < 0 {
            return None;
        }
        let angle = angle % 360;

        if angle >= PORTRAIT_UPPER_START || angle < PORTRAIT_LOWER_END {
            Some(OrientationBucket::Portrait)
        } else if (LANDSCAPE_RANGE.0..=LANDSCAPE_RANGE.1).contains(&angle) {
            Some(OrientationBucket::Landscape)
        } else if (REVERSE_LANDSCAPE_RANGE.0..=REVERSE_LANDSCAPE_RANGE.1).contains(&angle) {
            Some(OrientationBucket::ReverseLandscape)
        } else {
            None
        }
    }

    /// Feed one sample; returns the screen change to perform, if any
    pub fn on_sample(&mut self, angle: i32, ctx: OrientationContext) -> Option<OrientationDecision> {
        trace!("Orientation sample {}", angle);
        let bucket = Self::classify(angle)?;
        if ctx.locked {
            return None;
        }

        match bucket {
            OrientationBucket::Portrait => self.on_portrait(ctx),
            OrientationBucket::Landscape => {
                self.on_landscape(OrientationBucket::Landscape, HostOrientation::ReverseLandscape, ctx)
            }
            OrientationBucket::ReverseLandscape => {
                self.on_landscape(OrientationBucket::ReverseLandscape, HostOrientation::Landscape, ctx)
            }
            OrientationBucket::Unknown => None,
        }
    }

    fn on_portrait(&mut self, ctx: OrientationContext) -> Option<OrientationDecision> {
        if !ctx.follow_orientation || self.current == OrientationBucket::Portrait {
            return None;
        }

        let previous = std::mem::replace(&mut self.current, OrientationBucket::Portrait);
        debug!("Orientation bucket {:?} -> Portrait", previous);
        if previous.is_landscape() && !ctx.is_fullscreen {
            return None;
        }
        Some(OrientationDecision::ExitToPortrait)
    }

    /// `opposite` is the host orientation that signals a rotation the other way is in flight
    fn on_landscape(
        &mut self,
        bucket: OrientationBucket,
        opposite: HostOrientation,
        ctx: OrientationContext,
    ) -> Option<OrientationDecision> {
        if self.current == bucket {
            return None;
        }

        let previous = std::mem::replace(&mut self.current, bucket);
        debug!("Orientation bucket {:?} -> {:?}", previous, bucket);
        if previous == OrientationBucket::Portrait
            && ctx.host_orientation != opposite
            && ctx.is_fullscreen
        {
            return None;
        }

        let target = match bucket {
            OrientationBucket::ReverseLandscape => HostOrientation::ReverseLandscape,
            _ => HostOrientation::Landscape,
        };
        Some(OrientationDecision::EnterLandscape(target))
    }
}
