// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe visiting and the per-key edits built on it.
//!
//! [`visit_keys`] walks one curve and hands each key to a
//! [`KeyframeVisitor`]. A visitor may stop the walk early, which is how
//! the "is any selected handle not free" check works. Visitors that need
//! scene state read it from an [`EditData`] built once per operator run.
//!
//! Key times stay in action time. Visitors that compare keys against scene
//! frames carry the element's [`TimeMapping`] and convert only the times
//! they compare or write, so keys they leave alone are never touched.

use crate::nla::TimeMapping;
use crate::scene::Scene;
use ordoplay_editor_curves::{FCurve, HandleType, Interpolation, Keyframe};
use serde::{Deserialize, Serialize};

/// Whether a walk continues after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditFlow {
    /// Visit the next key
    Continue,
    /// Stop the walk
    Stop,
}

/// Which keys a walk hands to the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFilter {
    /// Every unlocked key
    All,
    /// Unlocked keys with any sub-element selected
    Selected,
}

/// Follow-up work once a walk completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterEdit {
    /// Leave the curve as the visitor left it
    Nothing,
    /// Recalculate handles
    RecalcHandles,
}

/// An edit applied to keys one at a time
pub trait KeyframeVisitor {
    /// Visit one key
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow;
}

impl<F: FnMut(&mut Keyframe) -> EditFlow> KeyframeVisitor for F {
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow {
        self(key)
    }
}

/// Walk the keys of a curve
///
/// Returns `true` when the visitor stopped the walk. Follow-up work only
/// runs for walks that complete.
pub fn visit_keys(
    curve: &mut FCurve,
    filter: KeyFilter,
    visitor: &mut dyn KeyframeVisitor,
    after: AfterEdit,
) -> bool {
    for key in &mut curve.points {
        if key.locked || (filter == KeyFilter::Selected && !key.is_selected()) {
            continue;
        }
        if visitor.visit(key) == EditFlow::Stop {
            return true;
        }
    }

    if after == AfterEdit::RecalcHandles {
        curve.recalculate_handles();
    }
    false
}

/// Scene state read by snapping and mirroring
#[derive(Debug, Clone, PartialEq)]
pub struct EditData {
    /// Current scene frame
    pub current_frame: f32,
    /// Playback rate
    pub frames_per_second: f32,
    /// Frames of every marker
    pub markers: Vec<f32>,
    /// Frame of the first selected marker
    pub marker_frame: Option<f32>,
}

impl Default for EditData {
    fn default() -> Self {
        Self {
            current_frame: 0.0,
            frames_per_second: 24.0,
            markers: Vec::new(),
            marker_frame: None,
        }
    }
}

impl EditData {
    /// Gather the data from a scene
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            current_frame: scene.current_frame as f32,
            frames_per_second: scene.frames_per_second,
            markers: scene.markers.iter().map(|m| m.frame as f32).collect(),
            marker_frame: scene.first_selected_marker().map(|m| m.frame as f32),
        }
    }

    /// Marker frame closest to `time`, earliest marker on a tie
    pub fn nearest_marker(&self, time: f32) -> Option<f32> {
        self.markers.iter().copied().fold(None, |best, m| match best {
            Some(b) if (b - time).abs() <= (m - time).abs() => Some(b),
            _ => Some(m),
        })
    }
}

fn scene_time(mapping: Option<TimeMapping>, time: f32) -> f32 {
    mapping.map_or(time, |m| m.to_scene(time))
}

fn action_time(mapping: Option<TimeMapping>, time: f32) -> f32 {
    mapping.map_or(time, |m| m.to_action(time))
}

/// Where snapping moves selected keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// Onto the current frame
    CurrentFrame,
    /// Onto the nearest whole frame
    #[default]
    NearestFrame,
    /// Onto the nearest whole second
    NearestSecond,
    /// Onto the nearest marker
    NearestMarker,
}

impl SnapMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurrentFrame => "Current frame",
            Self::NearestFrame => "Nearest Frame",
            Self::NearestSecond => "Nearest Second",
            Self::NearestMarker => "Nearest Marker",
        }
    }
}

/// What mirroring reflects selected keys over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MirrorMode {
    /// The current frame
    #[default]
    CurrentFrame,
    /// Frame zero
    VerticalAxis,
    /// Value zero
    HorizontalAxis,
    /// The first selected marker
    FirstSelectedMarker,
}

impl MirrorMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurrentFrame => "Current frame",
            Self::VerticalAxis => "Vertical Axis",
            Self::HorizontalAxis => "Horizontal Axis",
            Self::FirstSelectedMarker => "First Selected Marker",
        }
    }
}

/// Snaps point-selected keys in time
///
/// Targets are scene frames. A key with no target (nearest marker without
/// markers, nearest second without a usable playback rate) stays put.
pub struct SnapVisitor<'a> {
    /// Snap target
    pub mode: SnapMode,
    /// Scene state
    pub data: &'a EditData,
    /// Strip mapping of the curve being visited
    pub mapping: Option<TimeMapping>,
}

impl SnapVisitor<'_> {
    fn target(&self, scene_time: f32) -> Option<f32> {
        match self.mode {
            SnapMode::CurrentFrame => Some(self.data.current_frame),
            SnapMode::NearestFrame => Some((scene_time + 0.5).floor()),
            SnapMode::NearestSecond => {
                let fps = self.data.frames_per_second;
                (fps.is_finite() && fps > 0.0).then(|| (scene_time / fps + 0.5).floor() * fps)
            }
            SnapMode::NearestMarker => self.data.nearest_marker(scene_time),
        }
    }
}

impl KeyframeVisitor for SnapVisitor<'_> {
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow {
        if !key.is_key_selected() {
            return EditFlow::Continue;
        }
        if let Some(target) = self.target(scene_time(self.mapping, key.time())) {
            key.set_time(action_time(self.mapping, target));
        }
        EditFlow::Continue
    }
}

/// Mirrors point-selected keys over a frame or over value zero
pub struct MirrorVisitor<'a> {
    /// Mirror axis
    pub mode: MirrorMode,
    /// Scene state
    pub data: &'a EditData,
    /// Strip mapping of the curve being visited
    pub mapping: Option<TimeMapping>,
}

impl MirrorVisitor<'_> {
    /// Mirror line in the curve's action time
    fn mirror_frame(&self) -> Option<f32> {
        let frame = match self.mode {
            MirrorMode::CurrentFrame => Some(self.data.current_frame),
            MirrorMode::VerticalAxis => Some(0.0),
            MirrorMode::FirstSelectedMarker => self.data.marker_frame,
            MirrorMode::HorizontalAxis => None,
        };
        frame.map(|f| action_time(self.mapping, f))
    }
}

impl KeyframeVisitor for MirrorVisitor<'_> {
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow {
        if !key.is_key_selected() {
            return EditFlow::Continue;
        }
        if self.mode == MirrorMode::HorizontalAxis {
            key.co[1] = -key.co[1];
            key.left[1] = -key.left[1];
            key.right[1] = -key.right[1];
            return EditFlow::Continue;
        }
        let Some(frame) = self.mirror_frame() else {
            return EditFlow::Stop;
        };

        let reflect = |p: [f32; 2]| [2.0 * frame - p[0], p[1]];
        let (left, right) = (key.left, key.right);
        key.co = reflect(key.co);
        // the handles trade sides so left stays before the key
        key.left = reflect(right);
        key.right = reflect(left);
        std::mem::swap(&mut key.left_type, &mut key.right_type);
        std::mem::swap(&mut key.select.left, &mut key.select.right);
        EditFlow::Continue
    }
}

/// Sets the interpolation of selected keys
pub struct SetInterpolation(pub Interpolation);

impl KeyframeVisitor for SetInterpolation {
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow {
        key.interpolation = self.0;
        EditFlow::Continue
    }
}

/// Sets the type of each selected handle
///
/// A selected point counts as selecting both of its handles.
pub struct SetHandleType(pub HandleType);

impl KeyframeVisitor for SetHandleType {
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow {
        if key.select.left || key.select.key {
            key.left_type = self.0;
        }
        if key.select.right || key.select.key {
            key.right_type = self.0;
        }
        EditFlow::Continue
    }
}

/// Stops on the first selected handle that is not free
#[derive(Debug, Default)]
pub struct NotFreeCheck;

impl KeyframeVisitor for NotFreeCheck {
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow {
        let left = (key.select.left || key.select.key) && key.left_type != HandleType::Free;
        let right = (key.select.right || key.select.key) && key.right_type != HandleType::Free;
        if left || right {
            EditFlow::Stop
        } else {
            EditFlow::Continue
        }
    }
}

/// Accumulates the scene times of point-selected keys
#[derive(Debug, Default)]
pub struct TimeAverage {
    /// Sum of visited times
    pub sum: f32,
    /// Number of visited keys
    pub count: usize,
    /// Strip mapping of the curve being visited
    pub mapping: Option<TimeMapping>,
}

impl TimeAverage {
    /// Average time, if any key was visited
    pub fn average(&self) -> Option<f32> {
        (self.count > 0).then(|| self.sum / self.count as f32)
    }
}

impl KeyframeVisitor for TimeAverage {
    fn visit(&mut self, key: &mut Keyframe) -> EditFlow {
        if key.is_key_selected() {
            self.sum += scene_time(self.mapping, key.time());
            self.count += 1;
        }
        EditFlow::Continue
    }
}
