// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handle recalculation for curve keyframes.
//!
//! Every edit that moves or adds keys ends with [`FCurve::recalculate_handles`].
//! Only `Auto`, `Vector` and `Aligned` handles are rewritten; `Free` handles
//! keep whatever the user gave them apart from the time clamp.

use crate::curve::FCurve;
use crate::keyframe::{HandleType, Keyframe};

/// Spans shorter than this are treated as zero
const SPAN_EPSILON: f32 = 1e-6;

impl FCurve {
    /// Recompute handle positions of every keyframe from its neighbours
    pub fn recalculate_handles(&mut self) {
        let len = self.points.len();
        for i in 0..len {
            let prev = (i > 0).then(|| self.points[i - 1].co);
            let next = (i + 1 < len).then(|| self.points[i + 1].co);
            calc_key_handles(&mut self.points[i], prev, next);
        }
    }
}

fn mirror_point(center: [f32; 2], p: [f32; 2]) -> [f32; 2] {
    [2.0 * center[0] - p[0], 2.0 * center[1] - p[1]]
}

fn calc_key_handles(key: &mut Keyframe, prev: Option<[f32; 2]>, next: Option<[f32; 2]>) {
    let p2 = key.co;

    let neighbours = match (prev, next) {
        (Some(p), Some(n)) => Some((p, n)),
        (Some(p), None) => Some((p, mirror_point(p2, p))),
        (None, Some(n)) => Some((mirror_point(p2, n), n)),
        (None, None) => None,
    };

    match neighbours {
        Some((p1, p3)) => calc_neighbour_handles(key, p1, p3),
        None => {
            // a lone key gets flat handles one frame out
            if matches!(key.left_type, HandleType::Auto | HandleType::Vector) {
                key.left = [p2[0] - 1.0, p2[1]];
            }
            if matches!(key.right_type, HandleType::Auto | HandleType::Vector) {
                key.right = [p2[0] + 1.0, p2[1]];
            }
        }
    }

    // the right handle leads when both sides are aligned
    if key.right_type == HandleType::Aligned && key.left_type != HandleType::Aligned {
        key.right = align_to(p2, key.left, key.right);
    } else if key.left_type == HandleType::Aligned {
        key.left = align_to(p2, key.right, key.left);
    }

    clamp_handle_times(key);
}

fn calc_neighbour_handles(key: &mut Keyframe, p1: [f32; 2], p3: [f32; 2]) {
    let p2 = key.co;
    let dx_a = p2[0] - p1[0];
    let dx_b = p3[0] - p2[0];
    let span = p3[0] - p1[0];

    // local extremes (and flat spots) keep auto handles horizontal
    let ydiff1 = p1[1] - p2[1];
    let ydiff2 = p3[1] - p2[1];
    let extreme = (ydiff1 <= 0.0 && ydiff2 <= 0.0) || (ydiff1 >= 0.0 && ydiff2 >= 0.0);
    let slope = if span.abs() <= SPAN_EPSILON || extreme {
        0.0
    } else {
        (p3[1] - p1[1]) / span
    };

    match key.left_type {
        HandleType::Auto => {
            let dx = dx_a / 3.0;
            key.left = [p2[0] - dx, p2[1] - slope * dx];
        }
        HandleType::Vector => {
            key.left = [p2[0] + (p1[0] - p2[0]) / 3.0, p2[1] + (p1[1] - p2[1]) / 3.0];
        }
        HandleType::Free | HandleType::Aligned => {}
    }

    match key.right_type {
        HandleType::Auto => {
            let dx = dx_b / 3.0;
            key.right = [p2[0] + dx, p2[1] + slope * dx];
        }
        HandleType::Vector => {
            key.right = [p2[0] + (p3[0] - p2[0]) / 3.0, p2[1] + (p3[1] - p2[1]) / 3.0];
        }
        HandleType::Free | HandleType::Aligned => {}
    }
}

/// Place `follower` opposite `leader` around `center`, keeping its length
fn align_to(center: [f32; 2], leader: [f32; 2], follower: [f32; 2]) -> [f32; 2] {
    let lead = [leader[0] - center[0], leader[1] - center[1]];
    let lead_len = (lead[0] * lead[0] + lead[1] * lead[1]).sqrt();
    if lead_len <= SPAN_EPSILON {
        return follower;
    }

    let follow = [follower[0] - center[0], follower[1] - center[1]];
    let follow_len = (follow[0] * follow[0] + follow[1] * follow[1]).sqrt();
    let scale = follow_len / lead_len;

    [center[0] - lead[0] * scale, center[1] - lead[1] * scale]
}

fn clamp_handle_times(key: &mut Keyframe) {
    key.left[0] = key.left[0].min(key.co[0]);
    key.right[0] = key.right[0].max(key.co[0]);
}
