// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve evaluation.

use crate::curve::{Extrapolation, FCurve};
use crate::keyframe::{Interp, Interpolation, Keyframe};

/// Bisection steps used to invert the bezier time polynomial
const BEZIER_SOLVE_STEPS: usize = 32;

impl FCurve {
    /// Evaluate the curve value at a time
    ///
    /// An empty curve returns its cached value.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return self.cached_value;
        };

        if time <= first.time() {
            return self.extrapolate_before(time);
        }
        if time >= last.time() {
            return self.extrapolate_after(time);
        }

        let next = self.points.partition_point(|k| k.time() <= time);
        evaluate_segment(&self.points[next - 1], &self.points[next], time)
    }

    /// Evaluate and remember the result as the curve's current value
    pub fn evaluate_and_cache(&mut self, time: f32) -> f32 {
        let value = self.evaluate(time);
        self.cached_value = value;
        value
    }

    fn extrapolate_before(&self, time: f32) -> f32 {
        let first = &self.points[0];
        if self.extrapolation == Extrapolation::Constant
            || first.interpolation == Interpolation::Constant
        {
            return first.value();
        }

        let dx = first.time() - time;
        let slope = match first.interpolation {
            Interpolation::Bezier => slope_between(first.left, first.co),
            _ => self
                .points
                .get(1)
                .map_or(0.0, |second| slope_between(first.co, second.co)),
        };
        first.value() - slope * dx
    }

    fn extrapolate_after(&self, time: f32) -> f32 {
        let last = &self.points[self.points.len() - 1];
        if self.extrapolation == Extrapolation::Constant
            || last.interpolation == Interpolation::Constant
        {
            return last.value();
        }

        let dx = time - last.time();
        let slope = match last.interpolation {
            Interpolation::Bezier => slope_between(last.co, last.right),
            _ => self
                .points
                .len()
                .checked_sub(2)
                .map_or(0.0, |idx| slope_between(self.points[idx].co, last.co)),
        };
        last.value() + slope * dx
    }
}

fn slope_between(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = b[0] - a[0];
    if dx == 0.0 {
        0.0
    } else {
        (b[1] - a[1]) / dx
    }
}

fn evaluate_segment(a: &Keyframe, b: &Keyframe, time: f32) -> f32 {
    let span = b.time() - a.time();
    if span <= 0.0 {
        return b.value();
    }

    match a.interpolation {
        Interpolation::Constant => a.value(),
        Interpolation::Linear => Interp::lerp(a.value(), b.value(), (time - a.time()) / span),
        Interpolation::Bezier => {
            let (h1, h2) = correct_bezier_handles(a.co, a.right, b.left, b.co);
            let t = solve_bezier_time(a.co[0], h1[0], h2[0], b.co[0], time);
            Interp::bezier(a.co[1], h1[1], h2[1], b.co[1], t)
        }
    }
}

/// Shorten the handles of a segment so their time spans fit inside it
///
/// Keeps the time polynomial monotonic, which is what makes the curve a
/// function of time.
fn correct_bezier_handles(
    p0: [f32; 2],
    p1: [f32; 2],
    p2: [f32; 2],
    p3: [f32; 2],
) -> ([f32; 2], [f32; 2]) {
    let h1 = [p0[0] - p1[0], p0[1] - p1[1]];
    let h2 = [p3[0] - p2[0], p3[1] - p2[1]];

    let len = p3[0] - p0[0];
    let len1 = h1[0].abs();
    let len2 = h2[0].abs();

    if len1 + len2 == 0.0 || len1 + len2 <= len {
        return (p1, p2);
    }

    let fac = len / (len1 + len2);
    (
        [p0[0] - fac * h1[0], p0[1] - fac * h1[1]],
        [p3[0] - fac * h2[0], p3[1] - fac * h2[1]],
    )
}

fn solve_bezier_time(x0: f32, x1: f32, x2: f32, x3: f32, time: f32) -> f32 {
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..BEZIER_SOLVE_STEPS {
        let mid = 0.5 * (lo + hi);
        if Interp::bezier(x0, x1, x2, x3, mid) < time {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
