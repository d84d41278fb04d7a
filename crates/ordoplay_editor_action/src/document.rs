// SPDX-License-Identifier: MIT OR Apache-2.0
//! The animation data shown in the keyframe editor.
//!
//! Layout of a document:
//! - data blocks, each owning one action of grouped and ungrouped curves
//! - stroke layers, listed on their own in stroke-layer mode
//!
//! Display order is block by block: grouped curves under their group
//! header in group order, then the ungrouped curves.

use crate::nla::NlaStrip;
use indexmap::IndexMap;
use ordoplay_editor_curves::{CurveId, FCurve};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a data block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataBlockId(pub Uuid);

impl DataBlockId {
    /// Create a new random data block ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DataBlockId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a stroke layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub Uuid);

impl LayerId {
    /// Create a new random layer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Channel-list state shared by blocks, groups and layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelFlags {
    /// Children are listed
    pub expanded: bool,
    /// Hidden from the editor
    pub hidden: bool,
    /// Protected against editing
    pub protected: bool,
    /// Selected in the channel list
    pub selected: bool,
    /// The active channel of its kind
    pub active: bool,
}

impl Default for ChannelFlags {
    fn default() -> Self {
        Self {
            expanded: true,
            hidden: false,
            protected: false,
            selected: false,
            active: false,
        }
    }
}

/// A named group of curves inside an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelGroup {
    /// Group name, referenced by [`FCurve::group`]
    pub name: String,
    /// Channel flags
    #[serde(default)]
    pub flags: ChannelFlags,
}

impl ChannelGroup {
    /// Create an expanded group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: ChannelFlags::default(),
        }
    }
}

/// Curves owned by one data block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action name
    pub name: String,
    /// Groups by name, in display order
    pub groups: IndexMap<String, ChannelGroup>,
    /// Curves by ID, in display order
    pub curves: IndexMap<CurveId, FCurve>,
}

impl Action {
    /// Create an empty action
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a curve, creating its group when it names an unknown one
    pub fn add_curve(&mut self, curve: FCurve) -> CurveId {
        if let Some(group) = &curve.group {
            if !self.groups.contains_key(group) {
                self.groups.insert(group.clone(), ChannelGroup::new(group.clone()));
            }
        }
        let id = curve.id;
        self.curves.insert(id, curve);
        id
    }

    /// Curves of a group in display order
    pub fn group_curves<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a FCurve> + 'a {
        self.curves
            .values()
            .filter(move |c| c.group.as_deref() == Some(group))
    }

    /// Curves in no group, or in a group the action does not define
    pub fn ungrouped_curves(&self) -> impl Iterator<Item = &FCurve> + '_ {
        self.curves.values().filter(|c| match &c.group {
            None => true,
            Some(g) => !self.groups.contains_key(g),
        })
    }
}

/// An animated entity (object, material, ...) and its action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    /// Unique ID
    pub id: DataBlockId,
    /// Display name
    pub name: String,
    /// Channel flags
    #[serde(default)]
    pub flags: ChannelFlags,
    /// Strip placing the action in scene time
    #[serde(default)]
    pub strip: Option<NlaStrip>,
    /// Animation data
    pub action: Action,
}

impl DataBlock {
    /// Create a data block with an empty action
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: DataBlockId::new(),
            action: Action::new(format!("{name}Action")),
            name,
            flags: ChannelFlags::default(),
            strip: None,
        }
    }

    /// Play the action through a strip
    pub fn with_strip(mut self, strip: NlaStrip) -> Self {
        self.strip = Some(strip);
        self
    }
}

/// A frame of a stroke layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeFrame {
    /// Frame number
    pub frame: i32,
    /// Selected in the editor
    pub selected: bool,
}

/// A layer of drawn strokes, keyed by whole frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeLayer {
    /// Unique ID
    pub id: LayerId,
    /// Layer name
    pub name: String,
    /// Channel flags; `protected` means locked
    #[serde(default)]
    pub flags: ChannelFlags,
    /// Keyed frames in frame order
    pub frames: Vec<StrokeFrame>,
}

impl StrokeLayer {
    /// Create an empty layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            flags: ChannelFlags::default(),
            frames: Vec::new(),
        }
    }
}

/// All animation data visible to the keyframe editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimDocument {
    /// Data blocks in display order
    pub blocks: IndexMap<DataBlockId, DataBlock>,
    /// Stroke layers in display order
    #[serde(default)]
    pub stroke_layers: IndexMap<LayerId, StrokeLayer>,
}

impl AnimDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data block
    pub fn add_block(&mut self, block: DataBlock) -> DataBlockId {
        let id = block.id;
        self.blocks.insert(id, block);
        id
    }

    /// Add a stroke layer
    pub fn add_stroke_layer(&mut self, layer: StrokeLayer) -> LayerId {
        let id = layer.id;
        self.stroke_layers.insert(id, layer);
        id
    }

    /// Get a data block
    pub fn block(&self, id: DataBlockId) -> Option<&DataBlock> {
        self.blocks.get(&id)
    }

    /// Get a data block mutably
    pub fn block_mut(&mut self, id: DataBlockId) -> Option<&mut DataBlock> {
        self.blocks.get_mut(&id)
    }

    /// Find a curve in a block
    pub fn curve(&self, block: DataBlockId, curve: CurveId) -> Option<&FCurve> {
        self.blocks.get(&block)?.action.curves.get(&curve)
    }

    /// Find a curve in a block mutably
    pub fn curve_mut(&mut self, block: DataBlockId, curve: CurveId) -> Option<&mut FCurve> {
        self.blocks.get_mut(&block)?.action.curves.get_mut(&curve)
    }

    /// Total number of curves
    pub fn curve_count(&self) -> usize {
        self.blocks.values().map(|b| b.action.curves.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_curve_creates_group() {
        let mut action = Action::new("Walk");
        action.add_curve(FCurve::for_property("location", 0).with_group("Body"));
        action.add_curve(FCurve::for_property("location", 1).with_group("Body"));
        action.add_curve(FCurve::for_property("scale", 0));

        assert_eq!(action.groups.len(), 1);
        assert_eq!(action.group_curves("Body").count(), 2);
        assert_eq!(action.ungrouped_curves().count(), 1);
    }

    #[test]
    fn test_curve_lookup() {
        let mut doc = AnimDocument::new();
        let mut block = DataBlock::new("Cube");
        let curve = block.action.add_curve(FCurve::for_property("location", 2));
        let block_id = doc.add_block(block);

        assert!(doc.curve(block_id, curve).is_some());
        assert!(doc.curve(block_id, CurveId::new()).is_none());
        assert!(doc.curve_mut(DataBlockId::new(), curve).is_none());
        assert_eq!(doc.curve_count(), 1);
    }

    #[test]
    fn test_serialization() {
        let mut doc = AnimDocument::new();
        let mut block = DataBlock::new("Lamp").with_strip(NlaStrip::default());
        block.action.add_curve(FCurve::for_property("energy", 0));
        doc.add_block(block);
        doc.add_stroke_layer(StrokeLayer::new("Ink"));

        let ron_str = ron::ser::to_string_pretty(&doc, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: AnimDocument = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, doc);
    }
}
