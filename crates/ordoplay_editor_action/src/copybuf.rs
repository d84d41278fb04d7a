// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe copy/paste buffer.
//!
//! The buffer is an explicit service object owned by the host and lent to
//! each operator run through the context. It outlives any single editor,
//! so keys copied in one view can be pasted in another.

use crate::document::{AnimDocument, DataBlockId};
use crate::error::{OperatorError, Result};
use crate::filter::FilteredElement;
use ordoplay_editor_curves::{CurveId, FCurve, Keyframe};
use serde::{Deserialize, Serialize};

/// Where pasted keys land in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PasteOffset {
    /// The first copied key lands on the current frame
    #[default]
    Start,
    /// Keys keep their copied times
    None,
}

impl PasteOffset {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "Frame Start",
            Self::None => "No Offset",
        }
    }
}

/// What a buffer entry was copied from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveIdentity {
    /// Source curve
    pub curve: CurveId,
    /// Owning data block of the source curve
    pub block: DataBlockId,
    /// Animated property path of the source curve
    pub rna_path: Option<String>,
    /// Property component of the source curve
    pub array_index: usize,
}

impl CurveIdentity {
    fn of(block: DataBlockId, curve: &FCurve) -> Self {
        Self {
            curve: curve.id,
            block,
            rna_path: curve.rna_path.clone(),
            array_index: curve.array_index,
        }
    }
}

/// Keys copied from one curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyBufferItem {
    /// Source curve
    pub identity: CurveIdentity,
    /// Copied keys in time order
    pub keys: Vec<Keyframe>,
}

/// Shared keyframe copy/paste buffer
#[derive(Debug, Clone, Default)]
pub struct CopyBuffer {
    items: Vec<CopyBufferItem>,
    first_frame: Option<f32>,
}

impl CopyBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything in the buffer
    pub fn clear(&mut self) {
        self.items.clear();
        self.first_frame = None;
    }

    /// Whether the buffer holds no keys
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copied entries
    pub fn items(&self) -> &[CopyBufferItem] {
        &self.items
    }

    /// Earliest copied key time
    pub fn first_frame(&self) -> Option<f32> {
        self.first_frame
    }

    /// Replace the buffer contents with the selected keys of `elements`
    ///
    /// Curves without point-selected keys contribute nothing. Returns the
    /// number of keys copied.
    pub fn copy_from(&mut self, document: &AnimDocument, elements: &[FilteredElement]) -> usize {
        self.clear();
        let mut copied = 0;

        for (block, curve_id) in elements.iter().filter_map(FilteredElement::curve_key) {
            let Some(curve) = document.curve(block, curve_id) else {
                continue;
            };
            let keys: Vec<Keyframe> = curve
                .points
                .iter()
                .filter(|k| k.is_key_selected())
                .copied()
                .collect();
            let Some(first) = keys.first() else {
                continue;
            };

            self.first_frame = Some(self.first_frame.map_or(first.time(), |f| f.min(first.time())));
            copied += keys.len();
            self.items.push(CopyBufferItem {
                identity: CurveIdentity::of(block, curve),
                keys,
            });
        }

        tracing::debug!("Copied {} keys from {} curves", copied, self.items.len());
        copied
    }

    /// Entry to paste into `curve`
    ///
    /// The entry copied from the same curve wins. Failing that, an entry
    /// animating the same property path matches when its component
    /// matches too, or when the buffer holds a single entry. Curves with
    /// no property path only match themselves.
    pub fn find_match(&self, curve: &FCurve) -> Option<&CopyBufferItem> {
        if let Some(item) = self.items.iter().find(|i| i.identity.curve == curve.id) {
            return Some(item);
        }

        let path = curve.rna_path.as_deref()?;
        let single = self.items.len() == 1;
        self.items.iter().find(|i| {
            i.identity.rna_path.as_deref() == Some(path)
                && (single || i.identity.array_index == curve.array_index)
        })
    }

    /// Paste matching entries into the curves of `elements`
    ///
    /// Pasted keys replace keys already at the same frame. Returns the
    /// number of curves that received keys.
    pub fn paste_into(
        &self,
        document: &mut AnimDocument,
        elements: &[FilteredElement],
        offset: PasteOffset,
        current_frame: f32,
    ) -> Result<usize> {
        let delta = match (offset, self.first_frame) {
            (PasteOffset::Start, Some(first)) => current_frame - first,
            _ => 0.0,
        };

        let mut pasted = 0;
        for (block, curve_id) in elements.iter().filter_map(FilteredElement::curve_key) {
            let curve = document
                .curve_mut(block, curve_id)
                .ok_or(OperatorError::CurveNotFound {
                    block: Some(block),
                    curve: curve_id,
                })?;
            let Some(item) = self.find_match(curve) else {
                continue;
            };

            for key in &item.keys {
                let mut key = *key;
                key.offset_time(delta);
                curve.insert_keyframe(key);
            }
            curve.recalculate_handles();
            pasted += 1;
        }

        tracing::debug!("Pasted into {} curves with offset {}", pasted, delta);
        Ok(pasted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DataBlock;
    use crate::filter::{filter_channels, ContentKind, FilterFlags};
    use ordoplay_editor_curves::KeySelect;

    struct Fixture {
        doc: AnimDocument,
        block: DataBlockId,
        x: CurveId,
        y: CurveId,
    }

    fn keyed(mut curve: FCurve) -> FCurve {
        curve.recalculate_handles();
        curve
    }

    fn fixture() -> Fixture {
        let mut doc = AnimDocument::new();
        let mut block = DataBlock::new("Cube");
        let x = block.action.add_curve(keyed(
            FCurve::for_property("location", 0)
                .with_points([Keyframe::new(10.0, 1.0), Keyframe::new(20.0, 2.0)]),
        ));
        let y = block.action.add_curve(keyed(
            FCurve::for_property("location", 1)
                .with_points([Keyframe::new(15.0, 5.0).with_select(KeySelect::NONE)]),
        ));
        let block = doc.add_block(block);
        Fixture { doc, block, x, y }
    }

    fn curves(doc: &AnimDocument) -> Vec<FilteredElement> {
        filter_channels(doc, ContentKind::DopeSheet, FilterFlags::CURVES_ONLY, false)
    }

    #[test]
    fn test_copy_selected_keys() {
        let f = fixture();
        let mut buffer = CopyBuffer::new();
        assert_eq!(buffer.copy_from(&f.doc, &curves(&f.doc)), 2);
        assert_eq!(buffer.items().len(), 1);
        assert_eq!(buffer.items()[0].identity.curve, f.x);
        assert_eq!(buffer.first_frame(), Some(10.0));
    }

    #[test]
    fn test_copy_replaces_previous_contents() {
        let mut f = fixture();
        let mut buffer = CopyBuffer::new();
        buffer.copy_from(&f.doc, &curves(&f.doc));

        for curve in f.doc.blocks[&f.block].action.curves.values_mut() {
            curve.points.iter_mut().for_each(Keyframe::deselect_all);
        }
        assert_eq!(buffer.copy_from(&f.doc, &curves(&f.doc)), 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.first_frame(), None);
    }

    #[test]
    fn test_paste_onto_current_frame() {
        let mut f = fixture();
        let mut buffer = CopyBuffer::new();
        buffer.copy_from(&f.doc, &curves(&f.doc));

        let elements = curves(&f.doc);
        // a single buffered curve pastes into every component of its property
        assert_eq!(buffer.paste_into(&mut f.doc, &elements, PasteOffset::Start, 100.0).unwrap(), 2);
        let x = f.doc.curve(f.block, f.x).unwrap();
        let times: Vec<f32> = x.points.iter().map(Keyframe::time).collect();
        assert_eq!(times, vec![10.0, 20.0, 100.0, 110.0]);
        let y = f.doc.curve(f.block, f.y).unwrap();
        let times: Vec<f32> = y.points.iter().map(Keyframe::time).collect();
        assert_eq!(times, vec![15.0, 100.0, 110.0]);
    }

    #[test]
    fn test_paste_without_offset_is_identity() {
        let mut f = fixture();
        let before = f.doc.clone();
        let mut buffer = CopyBuffer::new();
        buffer.copy_from(&f.doc, &curves(&f.doc));

        let elements = curves(&f.doc);
        buffer.paste_into(&mut f.doc, &elements, PasteOffset::None, 0.0).unwrap();
        assert_eq!(f.doc.curve(f.block, f.x).unwrap().points, before.curve(f.block, f.x).unwrap().points);
    }

    #[test]
    fn test_single_entry_matches_any_component() {
        let f = fixture();
        let mut buffer = CopyBuffer::new();
        buffer.copy_from(&f.doc, &curves(&f.doc));

        let other = FCurve::for_property("location", 2);
        assert!(buffer.find_match(&other).is_some());
        assert!(buffer.find_match(&FCurve::for_property("rotation", 0)).is_none());
        assert!(buffer.find_match(&FCurve::new()).is_none());
    }

    #[test]
    fn test_component_must_match_with_several_entries() {
        let mut f = fixture();
        let y = f.y;
        f.doc.blocks[&f.block].action.curves[&y].points[0].select_all();
        let mut buffer = CopyBuffer::new();
        buffer.copy_from(&f.doc, &curves(&f.doc));
        assert_eq!(buffer.items().len(), 2);

        let z = FCurve::for_property("location", 2);
        assert!(buffer.find_match(&z).is_none());
        let other_y = FCurve::for_property("location", 1);
        assert_eq!(buffer.find_match(&other_y).unwrap().identity.curve, f.y);
    }

    #[test]
    fn test_paste_missing_curve_is_an_error() {
        let mut f = fixture();
        let mut buffer = CopyBuffer::new();
        buffer.copy_from(&f.doc, &curves(&f.doc));

        let mut elements = curves(&f.doc);
        elements[0].channel = crate::filter::ChannelRef::Curve(CurveId::new());
        let result = buffer.paste_into(&mut f.doc, &elements, PasteOffset::Start, 0.0);
        assert!(matches!(result, Err(OperatorError::CurveNotFound { .. })));
    }
}
