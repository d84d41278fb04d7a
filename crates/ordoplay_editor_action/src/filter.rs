// SPDX-License-Identifier: MIT OR Apache-2.0
//! Channel filtering.
//!
//! Operators never walk the document themselves; they ask for the channels
//! that pass a set of [`FilterFlags`] and act on the returned list. A
//! channel hidden, collapsed away or protected at any level above it is
//! treated the same as one hidden, collapsed or protected itself.

use crate::document::{AnimDocument, ChannelFlags, DataBlock, DataBlockId, LayerId};
use crate::nla::TimeMapping;
use bitflags::bitflags;
use ordoplay_editor_curves::{CurveId, FCurve};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Conditions a channel must meet to be returned by [`filter_channels`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FilterFlags: u32 {
        /// Not hidden and not inside a collapsed or hidden parent
        const VISIBLE = 1;
        /// Selected in the channel list
        const SELECTED = 1 << 1;
        /// Not protected, and not inside a protected parent
        const FOR_EDIT = 1 << 2;
        /// Only curves, no block, group or layer rows
        const CURVES_ONLY = 1 << 3;
        /// Only the active group and its curves
        const ACTIVE_GROUP = 1 << 4;
    }
}

/// What the editor is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentKind {
    /// A single action
    Action,
    /// Every animated data block
    #[default]
    DopeSheet,
    /// Stroke layers
    StrokeLayers,
}

/// The channel a filtered element refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// The data block summary row
    DataBlock,
    /// A group header
    Group(String),
    /// An animation curve
    Curve(CurveId),
    /// A stroke layer
    StrokeLayer(LayerId),
}

/// One channel returned by the filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredElement {
    /// Owning data block, `None` for stroke layers
    pub block: Option<DataBlockId>,
    /// The channel itself
    pub channel: ChannelRef,
    /// Strip time mapping of the owning block, when remapping applies
    pub time_mapping: Option<TimeMapping>,
}

impl FilteredElement {
    /// The curve behind this element, if it is a curve
    pub fn curve_id(&self) -> Option<CurveId> {
        match self.channel {
            ChannelRef::Curve(id) => Some(id),
            _ => None,
        }
    }

    /// Owning block and curve, if this element is a curve
    pub fn curve_key(&self) -> Option<(DataBlockId, CurveId)> {
        Some((self.block?, self.curve_id()?))
    }

    /// Whether this element is a curve
    pub fn is_curve(&self) -> bool {
        matches!(self.channel, ChannelRef::Curve(_))
    }
}

/// Channel-list flags shared by every channel kind
fn passes(flags: &ChannelFlags, filter: FilterFlags) -> bool {
    if filter.contains(FilterFlags::VISIBLE) && flags.hidden {
        return false;
    }
    if filter.contains(FilterFlags::FOR_EDIT) && flags.protected {
        return false;
    }
    true
}

fn curve_passes(curve: &FCurve, filter: FilterFlags) -> bool {
    if filter.contains(FilterFlags::VISIBLE) && curve.flags.hidden {
        return false;
    }
    if filter.contains(FilterFlags::FOR_EDIT) && curve.flags.protected {
        return false;
    }
    if filter.contains(FilterFlags::SELECTED) && !curve.flags.selected {
        return false;
    }
    true
}

/// Collect the channels of a document that pass `filter`
///
/// With `map_time` set, elements of blocks that play through a strip carry
/// the strip's [`TimeMapping`].
pub fn filter_channels(
    document: &AnimDocument,
    content: ContentKind,
    filter: FilterFlags,
    map_time: bool,
) -> Vec<FilteredElement> {
    let mut elements = Vec::new();

    match content {
        ContentKind::StrokeLayers => filter_stroke_layers(document, filter, &mut elements),
        ContentKind::Action | ContentKind::DopeSheet => {
            for block in document.blocks.values() {
                filter_block(block, filter, map_time, &mut elements);
            }
        }
    }

    tracing::trace!("Filter {:?} matched {} channels", filter, elements.len());
    elements
}

fn filter_block(
    block: &DataBlock,
    filter: FilterFlags,
    map_time: bool,
    out: &mut Vec<FilteredElement>,
) {
    if !passes(&block.flags, filter) {
        return;
    }

    let time_mapping = if map_time {
        block.strip.as_ref().map(TimeMapping::from_strip)
    } else {
        None
    };
    let element = |channel| FilteredElement {
        block: Some(block.id),
        channel,
        time_mapping,
    };

    let headers = !filter.contains(FilterFlags::CURVES_ONLY);
    let selected_only = filter.contains(FilterFlags::SELECTED);

    if headers
        && !filter.contains(FilterFlags::ACTIVE_GROUP)
        && (!selected_only || block.flags.selected)
    {
        out.push(element(ChannelRef::DataBlock));
    }

    if filter.contains(FilterFlags::VISIBLE) && !block.flags.expanded {
        return;
    }

    let action = &block.action;
    for group in action.groups.values() {
        if filter.contains(FilterFlags::ACTIVE_GROUP) && !group.flags.active {
            continue;
        }
        if !passes(&group.flags, filter) {
            continue;
        }

        if headers && (!selected_only || group.flags.selected) {
            out.push(element(ChannelRef::Group(group.name.clone())));
        }

        if filter.contains(FilterFlags::VISIBLE) && !group.flags.expanded {
            continue;
        }
        for curve in action.group_curves(&group.name) {
            if curve_passes(curve, filter) {
                out.push(element(ChannelRef::Curve(curve.id)));
            }
        }
    }

    if filter.contains(FilterFlags::ACTIVE_GROUP) {
        return;
    }
    for curve in action.ungrouped_curves() {
        if curve_passes(curve, filter) {
            out.push(element(ChannelRef::Curve(curve.id)));
        }
    }
}

fn filter_stroke_layers(document: &AnimDocument, filter: FilterFlags, out: &mut Vec<FilteredElement>) {
    if filter.contains(FilterFlags::CURVES_ONLY) {
        return;
    }
    for layer in document.stroke_layers.values() {
        if !passes(&layer.flags, filter) {
            continue;
        }
        if filter.contains(FilterFlags::SELECTED) && !layer.flags.selected {
            continue;
        }
        out.push(FilteredElement {
            block: None,
            channel: ChannelRef::StrokeLayer(layer.id),
            time_mapping: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{StrokeLayer, ChannelGroup};
    use crate::nla::NlaStrip;

    struct Fixture {
        doc: AnimDocument,
        grouped: CurveId,
        ungrouped: CurveId,
    }

    fn fixture() -> Fixture {
        let mut doc = AnimDocument::new();
        let mut block = DataBlock::new("Cube").with_strip(NlaStrip {
            start: 10.0,
            ..NlaStrip::default()
        });
        let grouped = block
            .action
            .add_curve(FCurve::for_property("location", 0).with_group("Transform"));
        let ungrouped = block.action.add_curve(FCurve::for_property("color", 0));
        doc.add_block(block);
        doc.add_stroke_layer(StrokeLayer::new("Sketch"));
        Fixture { doc, grouped, ungrouped }
    }

    fn curves(elements: &[FilteredElement]) -> Vec<CurveId> {
        elements.iter().filter_map(FilteredElement::curve_id).collect()
    }

    fn block_mut(doc: &mut AnimDocument) -> &mut DataBlock {
        doc.blocks.values_mut().next().unwrap()
    }

    fn group_mut(doc: &mut AnimDocument) -> &mut ChannelGroup {
        block_mut(doc).action.groups.get_mut("Transform").unwrap()
    }

    #[test]
    fn test_display_order_and_headers() {
        let f = fixture();
        let elements = filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::VISIBLE, false);
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0].channel, ChannelRef::DataBlock);
        assert_eq!(elements[1].channel, ChannelRef::Group("Transform".into()));
        assert_eq!(curves(&elements), vec![f.grouped, f.ungrouped]);
    }

    #[test]
    fn test_curves_only() {
        let f = fixture();
        let elements = filter_channels(
            &f.doc,
            ContentKind::DopeSheet,
            FilterFlags::VISIBLE | FilterFlags::CURVES_ONLY,
            false,
        );
        assert!(elements.iter().all(FilteredElement::is_curve));
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_collapsed_group_hides_curves_when_visible() {
        let mut f = fixture();
        group_mut(&mut f.doc).flags.expanded = false;

        let visible = filter_channels(
            &f.doc,
            ContentKind::DopeSheet,
            FilterFlags::VISIBLE | FilterFlags::CURVES_ONLY,
            false,
        );
        assert_eq!(curves(&visible), vec![f.ungrouped]);

        let all = filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::CURVES_ONLY, false);
        assert_eq!(curves(&all), vec![f.grouped, f.ungrouped]);
    }

    #[test]
    fn test_protected_parent_excludes_children_for_edit() {
        let mut f = fixture();
        group_mut(&mut f.doc).flags.protected = true;
        let editable = filter_channels(
            &f.doc,
            ContentKind::DopeSheet,
            FilterFlags::FOR_EDIT | FilterFlags::CURVES_ONLY,
            false,
        );
        assert_eq!(curves(&editable), vec![f.ungrouped]);

        block_mut(&mut f.doc).flags.protected = true;
        let editable = filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::FOR_EDIT, false);
        assert!(editable.is_empty());
    }

    #[test]
    fn test_hidden_block_excludes_everything() {
        let mut f = fixture();
        block_mut(&mut f.doc).flags.hidden = true;
        assert!(filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::VISIBLE, false).is_empty());
    }

    #[test]
    fn test_selected_curves() {
        let mut f = fixture();
        let ungrouped = f.ungrouped;
        block_mut(&mut f.doc).action.curves[&ungrouped].flags.selected = true;
        let selected = filter_channels(
            &f.doc,
            ContentKind::DopeSheet,
            FilterFlags::SELECTED | FilterFlags::CURVES_ONLY,
            false,
        );
        assert_eq!(curves(&selected), vec![f.ungrouped]);
    }

    #[test]
    fn test_active_group() {
        let mut f = fixture();
        let none = filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::ACTIVE_GROUP, false);
        assert!(none.is_empty());

        group_mut(&mut f.doc).flags.active = true;
        let active = filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::ACTIVE_GROUP, false);
        assert_eq!(active[0].channel, ChannelRef::Group("Transform".into()));
        assert_eq!(curves(&active), vec![f.grouped]);
    }

    #[test]
    fn test_time_mapping_attached() {
        let f = fixture();
        let mapped = filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::CURVES_ONLY, true);
        assert!(mapped.iter().all(|e| e.time_mapping.is_some()));
        let unmapped = filter_channels(&f.doc, ContentKind::DopeSheet, FilterFlags::CURVES_ONLY, false);
        assert!(unmapped.iter().all(|e| e.time_mapping.is_none()));
    }

    #[test]
    fn test_stroke_layers_are_not_curves() {
        let f = fixture();
        let layers = filter_channels(&f.doc, ContentKind::StrokeLayers, FilterFlags::VISIBLE, false);
        assert_eq!(layers.len(), 1);
        assert!(layers[0].curve_id().is_none());
        assert!(filter_channels(
            &f.doc,
            ContentKind::StrokeLayers,
            FilterFlags::CURVES_ONLY,
            false
        )
        .is_empty());
    }
}
