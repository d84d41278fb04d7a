// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time mapping between action time and scene time.
//!
//! A data block that plays its action through a strip sees keys at
//! `start + (t - action_start) * scale`. Keys are stored in action time;
//! the mapping is applied to the single times an edit compares against
//! scene frames.

use serde::{Deserialize, Serialize};

/// Scales below this are treated as 1 to keep the mapping invertible
const MIN_SCALE: f32 = 1e-6;

/// Placement of an action in scene time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NlaStrip {
    /// Scene frame where the strip begins
    pub start: f32,
    /// Action frame played at the strip start
    pub action_start: f32,
    /// Playback speed factor
    pub scale: f32,
}

impl Default for NlaStrip {
    fn default() -> Self {
        Self {
            start: 0.0,
            action_start: 0.0,
            scale: 1.0,
        }
    }
}

/// Invertible conversion derived from a strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapping {
    start: f32,
    action_start: f32,
    scale: f32,
}

impl TimeMapping {
    /// Build the mapping for a strip
    pub fn from_strip(strip: &NlaStrip) -> Self {
        let scale = if strip.scale.abs() < MIN_SCALE {
            1.0
        } else {
            strip.scale
        };
        Self {
            start: strip.start,
            action_start: strip.action_start,
            scale,
        }
    }

    /// Action frame to scene frame
    pub fn to_scene(&self, time: f32) -> f32 {
        self.start + (time - self.action_start) * self.scale
    }

    /// Scene frame to action frame
    pub fn to_action(&self, time: f32) -> f32 {
        self.action_start + (time - self.start) / self.scale
    }
}

impl From<&NlaStrip> for TimeMapping {
    fn from(strip: &NlaStrip) -> Self {
        Self::from_strip(strip)
    }
}
