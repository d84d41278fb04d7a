// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe point definitions for animation curves.

use serde::{Deserialize, Serialize};

/// Interpolation mode from a keyframe to the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interpolation {
    /// Hold the value until the next keyframe
    Constant,
    /// Straight line to the next keyframe
    Linear,
    /// Cubic bezier shaped by the handles
    #[default]
    Bezier,
}

impl Interpolation {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "Constant Interpolation",
            Self::Linear => "Linear Interpolation",
            Self::Bezier => "Bezier Interpolation",
        }
    }
}

/// How a handle is positioned when handles are recalculated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HandleType {
    /// User positioned, never touched by recalculation
    Free,
    /// Smooth handle derived from the neighbouring keyframes
    #[default]
    Auto,
    /// Points a third of the way towards the neighbouring keyframe
    Vector,
    /// User length, kept collinear with the opposite handle
    Aligned,
}

impl HandleType {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Free => "Free Handles",
            Self::Auto => "Auto Handles",
            Self::Vector => "Vector Handles",
            Self::Aligned => "Aligned Handles",
        }
    }
}

/// Selection state of the three sub-elements of a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeySelect {
    /// Left handle selected
    pub left: bool,
    /// Keyframe point selected
    pub key: bool,
    /// Right handle selected
    pub right: bool,
}

impl KeySelect {
    /// Everything selected
    pub const ALL: Self = Self {
        left: true,
        key: true,
        right: true,
    };

    /// Nothing selected
    pub const NONE: Self = Self {
        left: false,
        key: false,
        right: false,
    };

    /// Whether any sub-element is selected
    pub fn any(&self) -> bool {
        self.left || self.key || self.right
    }
}

/// A keyframe point on a curve
///
/// Coordinates are `[time, value]` with time in frames. The left handle is
/// expected to sit at or before the key and the right handle at or after it;
/// handle recalculation restores that when an edit breaks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Keyframe position `[time, value]`
    pub co: [f32; 2],
    /// Left (incoming) handle `[time, value]`
    pub left: [f32; 2],
    /// Right (outgoing) handle `[time, value]`
    pub right: [f32; 2],
    /// Left handle type
    pub left_type: HandleType,
    /// Right handle type
    pub right_type: HandleType,
    /// Interpolation to the next keyframe
    pub interpolation: Interpolation,
    /// Sub-element selection
    pub select: KeySelect,
    /// Locked against editing
    pub locked: bool,
}

impl Keyframe {
    /// Create a new selected keyframe with auto handles one frame either side
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            co: [time, value],
            left: [time - 1.0, value],
            right: [time + 1.0, value],
            left_type: HandleType::Auto,
            right_type: HandleType::Auto,
            interpolation: Interpolation::Bezier,
            select: KeySelect::ALL,
            locked: false,
        }
    }

    /// Set interpolation mode
    pub fn with_interpolation(mut self, mode: Interpolation) -> Self {
        self.interpolation = mode;
        self
    }

    /// Set both handle types
    pub fn with_handle_type(mut self, handle_type: HandleType) -> Self {
        self.left_type = handle_type;
        self.right_type = handle_type;
        self
    }

    /// Set both handle positions
    pub fn with_handles(mut self, left: [f32; 2], right: [f32; 2]) -> Self {
        self.left = left;
        self.right = right;
        self
    }

    /// Set the selection state
    pub fn with_select(mut self, select: KeySelect) -> Self {
        self.select = select;
        self
    }

    /// Keyframe time in frames
    pub fn time(&self) -> f32 {
        self.co[0]
    }

    /// Keyframe value
    pub fn value(&self) -> f32 {
        self.co[1]
    }

    /// Any of the point or its handles is selected
    pub fn is_selected(&self) -> bool {
        self.select.any()
    }

    /// The keyframe point itself is selected
    pub fn is_key_selected(&self) -> bool {
        self.select.key
    }

    /// Select the point and both handles
    pub fn select_all(&mut self) {
        self.select = KeySelect::ALL;
    }

    /// Deselect the point and both handles
    pub fn deselect_all(&mut self) {
        self.select = KeySelect::NONE;
    }

    /// Move the keyframe in time, carrying both handles along
    pub fn set_time(&mut self, time: f32) {
        let delta = time - self.co[0];
        self.co[0] = time;
        self.left[0] += delta;
        self.right[0] += delta;
    }

    /// Change the value, carrying both handles along
    pub fn set_value(&mut self, value: f32) {
        let delta = value - self.co[1];
        self.co[1] = value;
        self.left[1] += delta;
        self.right[1] += delta;
    }

    /// Shift the keyframe and its handles by a time offset
    pub fn offset_time(&mut self, delta: f32) {
        self.co[0] += delta;
        self.left[0] += delta;
        self.right[0] += delta;
    }
}

/// Interpolation utilities
pub struct Interp;

impl Interp {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Cubic bezier interpolation of one coordinate
    pub fn bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        p0 * mt3 + 3.0 * p1 * mt2 * t + 3.0 * p2 * mt * t2 + p3 * t3
    }
}
