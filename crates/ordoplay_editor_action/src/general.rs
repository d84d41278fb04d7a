// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-curve edits: cleaning, sampling, key insertion and refresh.

use crate::context::PropertyResolver;
use crate::document::{AnimDocument, DataBlockId};
use crate::filter::FilteredElement;
use crate::settings::KeyframeSettings;
use ordoplay_editor_curves::{FCurve, KeyDefaults, Keyframe};

fn is_eqt(a: f32, b: f32, threshold: f32) -> bool {
    (a - b).abs() <= threshold
}

/// Value at `time` on the straight line through two points
fn line_value(a: [f32; 2], b: [f32; 2], time: f32) -> f32 {
    let span = b[0] - a[0];
    if span == 0.0 {
        a[1]
    } else {
        a[1] + (b[1] - a[1]) * ((time - a[0]) / span)
    }
}

/// Remove keys that do not change the shape of the curve
///
/// Keys are tested against the last key kept so far:
/// - a key at the same time survives when its value differs; when the next
///   key shares that time too and holds a different value from the last
///   kept key, only the greater of the two stacked values survives
/// - an inner key survives when it is off the line from the last kept key
///   to the following key
/// - the final key survives when it differs from the last kept value
///
/// Surviving keys keep all their attributes. Returns the number of keys
/// removed.
pub fn clean_curve(curve: &mut FCurve, threshold: f32) -> usize {
    if curve.points.len() < 2 {
        return 0;
    }

    let old = std::mem::take(&mut curve.points);
    let mut kept: Vec<Keyframe> = Vec::with_capacity(old.len());
    kept.push(old[0]);

    for (i, key) in old.iter().enumerate().skip(1) {
        let prev = kept[kept.len() - 1].co;
        let cur = key.co;
        let next = old.get(i + 1).map(|k| k.co);

        let keep = if is_eqt(cur[0], prev[0], threshold) {
            let stacked = next.filter(|n| {
                is_eqt(cur[0], n[0], threshold) && !is_eqt(n[1], prev[1], threshold)
            });
            match stacked {
                Some(n) => cur[1] > n[1] && !is_eqt(cur[1], prev[1], threshold),
                None => !is_eqt(cur[1], prev[1], threshold),
            }
        } else {
            match next {
                Some(n) => !is_eqt(cur[1], line_value(prev, n, cur[0]), threshold),
                None => !is_eqt(cur[1], prev[1], threshold),
            }
        };

        if keep {
            kept.push(*key);
        }
    }

    let removed = old.len() - kept.len();
    curve.points = kept;
    curve.recalculate_handles();
    removed
}

/// Bake the curve onto whole frames between selected keys
///
/// Each pair of consecutive selected keys is a span; every whole frame
/// from the floor of the span start up to (not including) the span end
/// gets a key with the value the curve had before sampling. Frames that
/// already carry a key are left alone. Returns the number of keys added.
pub fn sample_curve(curve: &mut FCurve, defaults: &KeyDefaults) -> usize {
    let mut total = 0;
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i < curve.points.len() {
        if !curve.points[i].is_selected() {
            i += 1;
            continue;
        }

        if let Some(s) = start {
            let start_time = curve.points[s].time();
            let end_time = curve.points[i].time();
            let first_frame = start_time.floor();
            let frames = (end_time - start_time).ceil().max(0.0) as usize;

            // sample before inserting so new keys do not bend the values
            let samples: Vec<(f32, f32)> = (0..frames)
                .map(|n| {
                    let frame = first_frame + n as f32;
                    (frame, curve.evaluate(frame))
                })
                .collect();

            let mut inserted = 0;
            for (frame, value) in samples {
                if curve.search(frame).is_ok() {
                    continue;
                }
                curve.insert_key(frame, value, defaults, true);
                inserted += 1;
            }
            // the span end moved right by every key inserted before it
            i += inserted;
            total += inserted;
        }

        start = Some(i);
        i += 1;
    }

    curve.recalculate_handles();
    total
}

/// Whether a key with `value` at `time` would change the curve
///
/// Not needed when an equal key already sits at that time, when both
/// neighbours hold the value already, or when the only neighbour does.
pub fn new_key_needed(curve: &FCurve, time: f32, value: f32) -> bool {
    let same = |a: f32| (a - value).abs() <= f32::EPSILON;

    let next_idx = match curve.search(time) {
        Ok(idx) => return !same(curve.points[idx].value()),
        Err(idx) => idx,
    };

    let prev = next_idx.checked_sub(1).map(|i| curve.points[i].value());
    let next = curve.points.get(next_idx).map(Keyframe::value);

    match (prev, next) {
        (Some(p), Some(n)) => !(same(p) && same(n)),
        (Some(v), None) | (None, Some(v)) => !same(v),
        (None, None) => true,
    }
}

/// Key a curve at `frame`
///
/// Curves animating a property take the live (or visual) value from the
/// resolver and honour "only needed" keying. Other curves are keyed with
/// their own value at that frame. Returns whether a key was written.
pub fn insert_channel_key(
    curve: &mut FCurve,
    block: DataBlockId,
    frame: f32,
    settings: &KeyframeSettings,
    properties: Option<&dyn PropertyResolver>,
) -> bool {
    let defaults = settings.key_defaults();

    if let (Some(resolver), Some(path)) = (properties, curve.rna_path.as_deref()) {
        let value = if settings.insert_visual {
            resolver.visual_value(block, path, curve.array_index)
        } else {
            resolver.property_value(block, path, curve.array_index)
        };
        let Some(value) = value else {
            tracing::warn!("Could not resolve property {}[{}]", path, curve.array_index);
            return false;
        };
        if settings.insert_needed && !new_key_needed(curve, frame, value) {
            tracing::trace!("Skipping unneeded key at frame {}", frame);
            return false;
        }
        curve.insert_key(frame, value, &defaults, false);
        return true;
    }

    let value = curve.evaluate_and_cache(frame);
    curve.insert_key(frame, value, &defaults, false);
    true
}

/// Restore time order and handles after an edit
pub fn refresh_curve(curve: &mut FCurve) {
    if !curve.is_sorted() {
        curve.sort_by_time();
    }
    curve.recalculate_handles();
}

/// Refresh every curve among the filtered elements
pub fn refresh_curves(document: &mut AnimDocument, elements: &[FilteredElement]) {
    for (block, curve) in elements.iter().filter_map(FilteredElement::curve_key) {
        if let Some(curve) = document.curve_mut(block, curve) {
            refresh_curve(curve);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordoplay_editor_curves::{HandleType, Interpolation, KeySelect};

    fn curve(keys: &[(f32, f32)]) -> FCurve {
        FCurve::for_property("location", 0).with_points(
            keys.iter()
                .map(|&(t, v)| Keyframe::new(t, v).with_interpolation(Interpolation::Linear)),
        )
    }

    fn co(curve: &FCurve) -> Vec<(f32, f32)> {
        curve.points.iter().map(|k| (k.time(), k.value())).collect()
    }

    struct Fixed(f32);

    impl PropertyResolver for Fixed {
        fn property_value(&self, _: DataBlockId, _: &str, _: usize) -> Option<f32> {
            Some(self.0)
        }

        fn visual_value(&self, _: DataBlockId, _: &str, _: usize) -> Option<f32> {
            Some(self.0 * 10.0)
        }
    }

    #[test]
    fn test_clean_removes_collinear_key() {
        let mut c = curve(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 5.0)]);
        assert_eq!(clean_curve(&mut c, 0.0), 1);
        assert_eq!(co(&c), vec![(0.0, 0.0), (2.0, 2.0), (3.0, 5.0)]);
    }

    #[test]
    fn test_clean_removes_flat_run() {
        let mut c = curve(&[(0.0, 1.0), (5.0, 1.0), (10.0, 1.0)]);
        assert_eq!(clean_curve(&mut c, 0.001), 2);
        assert_eq!(co(&c), vec![(0.0, 1.0)]);
    }

    #[test]
    fn test_clean_keeps_attributes_of_survivors() {
        let mut c = curve(&[(0.0, 0.0), (5.0, 3.0), (10.0, 0.0)]);
        c.points[1].interpolation = Interpolation::Constant;
        c.points[1].left_type = HandleType::Free;
        clean_curve(&mut c, 0.0);
        assert_eq!(c.len(), 3);
        assert_eq!(c.points[1].interpolation, Interpolation::Constant);
        assert_eq!(c.points[1].left_type, HandleType::Free);
    }

    #[test]
    fn test_clean_threshold() {
        let mut c = curve(&[(0.0, 0.0), (1.0, 1.05), (2.0, 2.0), (3.0, 5.0)]);
        assert_eq!(clean_curve(&mut c, 0.01), 0);
        assert_eq!(clean_curve(&mut c, 0.1), 1);
    }

    #[test]
    fn test_clean_stacked_keys_keep_greater_value() {
        let mut c = curve(&[(0.0, 0.0), (0.0005, 5.0), (0.0008, 3.0)]);
        assert_eq!(clean_curve(&mut c, 0.001), 0);
        assert_eq!(co(&c), vec![(0.0, 0.0), (0.0005, 5.0), (0.0008, 3.0)]);

        let mut c = curve(&[(0.0, 0.0), (0.0005, 3.0), (0.0008, 5.0)]);
        assert_eq!(clean_curve(&mut c, 0.001), 1);
        assert_eq!(co(&c), vec![(0.0, 0.0), (0.0008, 5.0)]);
    }

    #[test]
    fn test_clean_single_key() {
        let mut c = curve(&[(4.0, 2.0)]);
        assert_eq!(clean_curve(&mut c, 1.0), 0);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_sample_fills_whole_frames() {
        let mut c = curve(&[(0.0, 0.0), (5.0, 10.0)]);
        let original = [c.points[0].co, c.points[1].co];

        assert_eq!(sample_curve(&mut c, &KeyDefaults::default()), 4);
        let values: Vec<(f32, f32)> = co(&c);
        assert_eq!(values.len(), 6);
        for (frame, expected) in [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0), (4.0, 8.0)] {
            let key = c.key_at(frame).unwrap();
            assert!((key.value() - expected).abs() < 1e-4);
        }
        assert_eq!(c.points[0].co, original[0]);
        assert_eq!(c.points[5].co, original[1]);
    }

    #[test]
    fn test_sample_chains_spans() {
        let mut c = curve(&[(0.0, 0.0), (2.0, 2.0), (4.0, 0.0)]);
        assert_eq!(sample_curve(&mut c, &KeyDefaults::default()), 2);
        let times: Vec<f32> = c.points.iter().map(Keyframe::time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!((c.key_at(3.0).unwrap().value() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_fractional_start_keys_floor_frame() {
        let mut c = curve(&[(0.5, 0.0), (3.0, 5.0)]);
        assert_eq!(sample_curve(&mut c, &KeyDefaults::default()), 3);
        let times: Vec<f32> = c.points.iter().map(Keyframe::time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 2.0, 3.0]);
        // frame 0 lies before the span and holds the first value
        assert_eq!(c.key_at(0.0).unwrap().value(), 0.0);
        assert!((c.key_at(1.0).unwrap().value() - 1.0).abs() < 1e-4);
        assert!((c.key_at(2.0).unwrap().value() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_span_without_inner_frames() {
        let mut c = curve(&[(2.2, 0.0), (2.8, 1.0)]);
        assert_eq!(sample_curve(&mut c, &KeyDefaults::default()), 1);
        let times: Vec<f32> = c.points.iter().map(Keyframe::time).collect();
        assert_eq!(times, vec![2.0, 2.2, 2.8]);
        assert_eq!(c.points[0].value(), 0.0);

        let mut c = curve(&[(2.0, 0.0), (2.5, 1.0)]);
        assert_eq!(sample_curve(&mut c, &KeyDefaults::default()), 0);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_sample_skips_unselected_spans() {
        let mut c = curve(&[(0.0, 0.0), (4.0, 4.0)]);
        c.points[1].select = KeySelect::NONE;
        assert_eq!(sample_curve(&mut c, &KeyDefaults::default()), 0);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_new_key_needed() {
        let c = curve(&[(0.0, 1.0), (10.0, 1.0)]);
        assert!(!new_key_needed(&c, 5.0, 1.0));
        assert!(new_key_needed(&c, 5.0, 2.0));
        assert!(!new_key_needed(&c, 10.0, 1.0));
        assert!(!new_key_needed(&c, 20.0, 1.0));
        assert!(new_key_needed(&FCurve::new(), 0.0, 0.0));
    }

    #[test]
    fn test_insert_uses_curve_value_without_resolver() {
        let mut c = curve(&[(0.0, 0.0), (10.0, 10.0)]);
        let settings = KeyframeSettings::default();
        assert!(insert_channel_key(&mut c, DataBlockId::new(), 4.0, &settings, None));
        assert_eq!(c.len(), 3);
        assert!((c.key_at(4.0).unwrap().value() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_insert_reads_property() {
        let mut c = curve(&[(0.0, 0.0)]);
        let settings = KeyframeSettings::default();
        let resolver = Fixed(3.0);
        assert!(insert_channel_key(&mut c, DataBlockId::new(), 8.0, &settings, Some(&resolver)));
        assert_eq!(c.key_at(8.0).unwrap().value(), 3.0);

        let visual = KeyframeSettings {
            insert_visual: true,
            ..KeyframeSettings::default()
        };
        insert_channel_key(&mut c, DataBlockId::new(), 9.0, &visual, Some(&resolver));
        assert_eq!(c.key_at(9.0).unwrap().value(), 30.0);
    }

    #[test]
    fn test_insert_needed_skips_redundant_key() {
        let mut c = curve(&[(0.0, 3.0)]);
        let settings = KeyframeSettings {
            insert_needed: true,
            ..KeyframeSettings::default()
        };
        let resolver = Fixed(3.0);
        assert!(!insert_channel_key(&mut c, DataBlockId::new(), 8.0, &settings, Some(&resolver)));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_refresh_sorts() {
        let mut c = curve(&[(0.0, 0.0), (5.0, 1.0)]);
        c.points[0].set_time(9.0);
        refresh_curve(&mut c);
        assert!(c.is_sorted());
        assert_eq!(c.points[1].time(), 9.0);
    }
}
