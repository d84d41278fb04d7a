// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene timeline state and the editor view rectangle.

use egui::{pos2, Rect};
use serde::{Deserialize, Serialize};

/// A named marker on the scene timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMarker {
    /// Frame of the marker
    pub frame: i32,
    /// Marker name
    pub name: String,
    /// Selected in the marker row
    #[serde(default)]
    pub selected: bool,
}

impl TimeMarker {
    /// Create an unselected marker
    pub fn new(frame: i32, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
            selected: false,
        }
    }

    /// Mark as selected
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// Scene timeline state the keyframe operators read and write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Current frame
    pub current_frame: i32,
    /// First frame of the scene range
    pub start_frame: i32,
    /// Last frame of the scene range
    pub end_frame: i32,
    /// Preview playback range, when one is set
    pub preview_range: Option<(i32, i32)>,
    /// Playback rate
    pub frames_per_second: f32,
    /// Timeline markers
    pub markers: Vec<TimeMarker>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            current_frame: 1,
            start_frame: 1,
            end_frame: 250,
            preview_range: None,
            frames_per_second: 24.0,
            markers: Vec::new(),
        }
    }
}

impl Scene {
    /// First selected marker in timeline order of insertion
    pub fn first_selected_marker(&self) -> Option<&TimeMarker> {
        self.markers.iter().find(|m| m.selected)
    }

    /// Scene range as floats
    pub fn frame_range(&self) -> (f32, f32) {
        (self.start_frame as f32, self.end_frame as f32)
    }
}

/// Visible region of the keyframe editor
///
/// `cur` spans frames horizontally; `mask` is the region in pixels, used only
/// for its height since the editor scrolls channels from the top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View2D {
    /// Visible data rectangle
    pub cur: Rect,
    /// Region rectangle in pixels
    pub mask: Rect,
}

impl Default for View2D {
    fn default() -> Self {
        Self {
            cur: Rect::from_min_max(pos2(0.0, -400.0), pos2(250.0, 0.0)),
            mask: Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 400.0)),
        }
    }
}

impl View2D {
    /// Fit the horizontal range, keep the channel list scrolled to the top
    pub fn fit_frames(&mut self, min: f32, max: f32) {
        self.cur = Rect::from_min_max(pos2(min, -self.mask.height()), pos2(max, 0.0));
    }
}
