// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame range covered by the editable keys.

use crate::context::AnimContext;
use crate::filter::FilterFlags;

/// Sentinel bound larger than any real frame
const EXTENT_SENTINEL: f32 = 999_999_999.0;

impl AnimContext<'_> {
    /// Scene-time range of the visible, selected, editable curves
    ///
    /// Curves played through a strip contribute their mapped range. With no
    /// contributing curve the scene range is used, or the configured
    /// fallback range when there is no scene either.
    pub fn keyframe_extents(&self) -> (f32, f32) {
        let flags = FilterFlags::VISIBLE
            | FilterFlags::SELECTED
            | FilterFlags::FOR_EDIT
            | FilterFlags::CURVES_ONLY;

        let mut min = EXTENT_SENTINEL;
        let mut max = -EXTENT_SENTINEL;
        let mut found = false;

        if let Some(document) = self.document.as_deref() {
            for element in self.filter(flags) {
                let Some((block, curve)) = element.curve_key() else {
                    continue;
                };
                let Some((start, end)) = document.curve(block, curve).and_then(|c| c.range()) else {
                    continue;
                };
                let (start, end) = match element.time_mapping {
                    Some(mapping) => (mapping.to_scene(start), mapping.to_scene(end)),
                    None => (start, end),
                };
                min = min.min(start.min(end));
                max = max.max(start.max(end));
                found = true;
            }
        }

        if found {
            return (min, max);
        }
        match self.scene.as_deref() {
            Some(scene) => scene.frame_range(),
            None => self.settings.fallback_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::context::AnimContext;
    use crate::copybuf::CopyBuffer;
    use crate::document::{AnimDocument, DataBlock};
    use crate::nla::NlaStrip;
    use crate::scene::Scene;
    use crate::settings::KeyframeSettings;
    use ordoplay_editor_curves::{FCurve, Keyframe};

    fn selected_curve(times: &[f32]) -> FCurve {
        let mut curve = FCurve::new().with_points(times.iter().map(|&t| Keyframe::new(t, 0.0)));
        curve.flags.selected = true;
        curve
    }

    #[test]
    fn test_extents_fold_all_curves() {
        let mut doc = AnimDocument::new();
        let mut block = DataBlock::new("Cube");
        block.action.add_curve(selected_curve(&[5.0, 20.0]));
        block.action.add_curve(selected_curve(&[-3.0, 8.0]));
        let mut unselected = FCurve::new().with_points([Keyframe::new(500.0, 0.0)]);
        unselected.flags.selected = false;
        block.action.add_curve(unselected);
        doc.add_block(block);

        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let ctx = AnimContext::new(&mut doc, &settings, &mut buffer);
        assert_eq!(ctx.keyframe_extents(), (-3.0, 20.0));
    }

    #[test]
    fn test_extents_mapped_through_strip() {
        let mut doc = AnimDocument::new();
        let mut block = DataBlock::new("Cube").with_strip(NlaStrip {
            start: 100.0,
            action_start: 0.0,
            scale: 2.0,
        });
        block.action.add_curve(selected_curve(&[0.0, 10.0]));
        doc.add_block(block);

        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let ctx = AnimContext::new(&mut doc, &settings, &mut buffer);
        assert_eq!(ctx.keyframe_extents(), (100.0, 120.0));
    }

    #[test]
    fn test_extents_fall_back_to_scene_range() {
        let mut doc = AnimDocument::new();
        let mut scene = Scene {
            start_frame: 10,
            end_frame: 80,
            ..Scene::default()
        };
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let ctx = AnimContext::new(&mut doc, &settings, &mut buffer).with_scene(&mut scene);
        assert_eq!(ctx.keyframe_extents(), (10.0, 80.0));
    }

    #[test]
    fn test_extents_fall_back_to_default_span() {
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let ctx = AnimContext::empty(&settings, &mut buffer);
        assert_eq!(ctx.keyframe_extents(), (-5.0, 100.0));
    }
}
