// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation curve (F-Curve) definitions.

use crate::keyframe::{HandleType, Interpolation, Keyframe};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Two keyframes closer than this many frames are treated as the same key
pub const KEY_TIME_THRESHOLD: f32 = 0.01;

/// Unique identifier for a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveId(pub Uuid);

impl CurveId {
    /// Create a new random curve ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CurveId {
    fn default() -> Self {
        Self::new()
    }
}

/// Curve behaviour before the first and after the last keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Extrapolation {
    /// Hold the end values
    #[default]
    Constant,
    /// Continue along the end slope
    Linear,
}

impl Extrapolation {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "Constant Extrapolation",
            Self::Linear => "Linear Extrapolation",
        }
    }
}

/// Channel state flags of a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurveFlags {
    /// Channel is selected in the channel list
    pub selected: bool,
    /// Channel is the active one
    pub active: bool,
    /// Channel is hidden from the editor
    pub hidden: bool,
    /// Channel is protected against editing
    pub protected: bool,
}

/// Attributes given to keyframes created by insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyDefaults {
    /// Interpolation of new keys
    pub interpolation: Interpolation,
    /// Handle type of new keys
    pub handle_type: HandleType,
}

/// An animation curve: ordered keyframe points plus extrapolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    /// Unique curve ID
    pub id: CurveId,
    /// Keyframe points ordered by time
    pub points: Vec<Keyframe>,
    /// Behaviour outside the keyed range
    pub extrapolation: Extrapolation,
    /// Name of the channel group this curve belongs to
    pub group: Option<String>,
    /// Path of the animated property
    pub rna_path: Option<String>,
    /// Component of a multi-component property
    pub array_index: usize,
    /// Channel flags
    pub flags: CurveFlags,
    /// Last evaluated value
    pub cached_value: f32,
}

impl FCurve {
    /// Create an empty curve
    pub fn new() -> Self {
        Self {
            id: CurveId::new(),
            points: Vec::new(),
            extrapolation: Extrapolation::Constant,
            group: None,
            rna_path: None,
            array_index: 0,
            flags: CurveFlags::default(),
            cached_value: 0.0,
        }
    }

    /// Create a curve animating a property component
    pub fn for_property(rna_path: impl Into<String>, array_index: usize) -> Self {
        Self {
            rna_path: Some(rna_path.into()),
            array_index,
            ..Self::new()
        }
    }

    /// Put the curve in a named group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Replace the keyframe points, sorted by time
    pub fn with_points(mut self, points: impl IntoIterator<Item = Keyframe>) -> Self {
        self.points = points.into_iter().collect();
        self.sort_by_time();
        self
    }

    /// Number of keyframe points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve has no keyframes
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keyframe points
    pub fn points(&self) -> &[Keyframe] {
        &self.points
    }

    /// Whether any keyframe (point or handle) is selected
    pub fn has_selected_keys(&self) -> bool {
        self.points.iter().any(Keyframe::is_selected)
    }

    /// Locate a time in the point list
    ///
    /// `Ok(i)` when a key sits within [`KEY_TIME_THRESHOLD`] of `time`,
    /// otherwise `Err(i)` with the index that keeps the list ordered.
    pub fn search(&self, time: f32) -> Result<usize, usize> {
        let mut lo = 0;
        let mut hi = self.points.len();

        while lo < hi {
            let mid = (lo + hi) / 2;
            let key_time = self.points[mid].time();
            if (key_time - time).abs() <= KEY_TIME_THRESHOLD {
                return Ok(mid);
            }
            if time < key_time {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        Err(lo)
    }

    /// Get the keyframe at a time (within the key threshold)
    pub fn key_at(&self, time: f32) -> Option<&Keyframe> {
        self.search(time).ok().map(|idx| &self.points[idx])
    }

    /// Insert a key at `time`, or update the value of the key already there
    ///
    /// New keys are fully selected and take their interpolation and handle
    /// types from `defaults`. With `fast` set, handles are left for the
    /// caller to recalculate once a batch of insertions is done.
    pub fn insert_key(&mut self, time: f32, value: f32, defaults: &KeyDefaults, fast: bool) -> usize {
        let idx = match self.search(time) {
            Ok(idx) => {
                self.points[idx].set_value(value);
                idx
            }
            Err(idx) => {
                let key = Keyframe::new(time, value)
                    .with_interpolation(defaults.interpolation)
                    .with_handle_type(defaults.handle_type);
                self.points.insert(idx, key);
                idx
            }
        };

        if !fast {
            self.recalculate_handles();
        }
        idx
    }

    /// Insert a complete keyframe, replacing any key at the same time
    pub fn insert_keyframe(&mut self, keyframe: Keyframe) -> usize {
        match self.search(keyframe.time()) {
            Ok(idx) => {
                self.points[idx] = keyframe;
                idx
            }
            Err(idx) => {
                self.points.insert(idx, keyframe);
                idx
            }
        }
    }

    /// Sort keyframes by time
    pub fn sort_by_time(&mut self) {
        self.points.sort_by(|a, b| a.time().total_cmp(&b.time()));
    }

    /// Whether keyframe times are in non-decreasing order
    pub fn is_sorted(&self) -> bool {
        self.points.windows(2).all(|w| w[0].time() <= w[1].time())
    }

    /// Time span covered by the keyframes
    pub fn range(&self) -> Option<(f32, f32)> {
        if self.points.is_empty() {
            return None;
        }
        let (min, max) = self
            .points
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), k| (lo.min(k.time()), hi.max(k.time())));
        Some((min, max))
    }

    /// Remove every unlocked keyframe whose point is selected
    ///
    /// The curve itself stays even when it ends up empty.
    pub fn delete_selected_keys(&mut self) -> usize {
        let before = self.points.len();
        self.points.retain(|k| k.locked || !k.is_key_selected());
        before - self.points.len()
    }

    /// Duplicate every point-selected keyframe in place
    ///
    /// Each copy lands directly after its source; the source is deselected
    /// and the copy keeps the selection, ready to be moved.
    pub fn duplicate_selected_keys(&mut self) -> usize {
        let mut duplicated = 0;
        let mut i = 0;

        while i < self.points.len() {
            if self.points[i].is_key_selected() {
                let copy = self.points[i];
                self.points[i].deselect_all();
                self.points.insert(i + 1, copy);
                duplicated += 1;
                i += 1;
            }
            i += 1;
        }

        duplicated
    }
}

impl Default for FCurve {
    fn default() -> Self {
        Self::new()
    }
}
