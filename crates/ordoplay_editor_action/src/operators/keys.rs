// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operators adding, removing and transferring keys.

use super::{finish, for_each_curve, KeyframeOperator, OperatorStatus};
use crate::context::{AnimContext, Interaction, Notification};
use crate::copybuf::PasteOffset;
use crate::error::{OperatorError, Result};
use crate::filter::FilterFlags;
use crate::general::{clean_curve, insert_channel_key, refresh_curves, sample_curve};
use serde::{Deserialize, Serialize};

/// Channels editing operators work on
fn editable_curves() -> FilterFlags {
    FilterFlags::VISIBLE | FilterFlags::FOR_EDIT | FilterFlags::CURVES_ONLY
}

/// Copy the selected keys into the copy buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyKeys;

impl KeyframeOperator for CopyKeys {
    fn idname(&self) -> &'static str {
        "action.copy"
    }

    fn name(&self) -> &'static str {
        "Copy Keyframes"
    }

    fn description(&self) -> &'static str {
        "Copy selected keyframes to the copy/paste buffer"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::PassThrough);
        }
        let elements = ctx.filter(editable_curves() | FilterFlags::SELECTED);
        let Some(document) = ctx.document.as_deref() else {
            return Ok(OperatorStatus::Cancelled);
        };

        if ctx.copy_buffer.copy_from(document, &elements) == 0 {
            ctx.reports.info("No keyframes copied to copy-paste buffer");
        }
        finish(ctx, Notification::KeyframesEdited)
    }
}

/// Paste the copy buffer into matching editable curves
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PasteKeys {
    /// Where the pasted keys land in time
    #[serde(default)]
    pub offset: PasteOffset,
}

impl KeyframeOperator for PasteKeys {
    fn idname(&self) -> &'static str {
        "action.paste"
    }

    fn name(&self) -> &'static str {
        "Paste Keyframes"
    }

    fn description(&self) -> &'static str {
        "Paste keyframes from the copy/paste buffer into matching channels"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::PassThrough);
        }
        if ctx.copy_buffer.is_empty() {
            ctx.reports.info("Nothing to paste, as Copy-Paste buffer was empty");
            return Ok(OperatorStatus::Finished);
        }

        let elements = ctx.filter(editable_curves());
        let current_frame = ctx.scene.as_deref().map_or(0.0, |s| s.current_frame as f32);
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let pasted = ctx
            .copy_buffer
            .paste_into(document, &elements, self.offset, current_frame)?;
        if pasted == 0 {
            ctx.reports.warning("Keyframe pasting failed: no matching channels");
        }
        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframesEdited)
    }
}

/// Which curves insertion keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InsertScope {
    /// Every editable curve
    #[default]
    All,
    /// Curves selected in the channel list
    Selected,
    /// Curves of the active group
    ActiveGroup,
}

impl InsertScope {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "All Channels",
            Self::Selected => "Only Selected Channels",
            Self::ActiveGroup => "In Active Group",
        }
    }

    fn flags(&self) -> FilterFlags {
        match self {
            Self::All => FilterFlags::empty(),
            Self::Selected => FilterFlags::SELECTED,
            Self::ActiveGroup => FilterFlags::ACTIVE_GROUP,
        }
    }
}

/// Insert keys on the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertKeys {
    /// Which curves get a key
    #[serde(default)]
    pub scope: InsertScope,
}

impl KeyframeOperator for InsertKeys {
    fn idname(&self) -> &'static str {
        "action.insert"
    }

    fn name(&self) -> &'static str {
        "Insert Keyframes"
    }

    fn description(&self) -> &'static str {
        "Insert keyframes for the specified channels"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::Cancelled);
        }
        let Some(frame) = ctx.scene.as_deref().map(|s| s.current_frame as f32) else {
            return Ok(OperatorStatus::Cancelled);
        };

        let elements = ctx.filter(editable_curves() | self.scope.flags());
        let settings = ctx.settings;
        let properties = ctx.properties;
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut inserted = 0;
        for_each_curve(document, &elements, |element, curve| {
            let Some(block) = element.block else {
                return;
            };
            if insert_channel_key(curve, block, frame, settings, properties) {
                inserted += 1;
            }
        })?;
        tracing::debug!("Inserted {} keys at frame {}", inserted, frame);

        finish(ctx, Notification::KeyframesEdited)
    }
}

/// Duplicate the selected keys in place
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateKeys;

impl KeyframeOperator for DuplicateKeys {
    fn idname(&self) -> &'static str {
        "action.duplicate"
    }

    fn name(&self) -> &'static str {
        "Duplicate Keyframes"
    }

    fn description(&self) -> &'static str {
        "Make a copy of all selected keyframes"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        let elements = ctx.filter(editable_curves());
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut duplicated = 0;
        for_each_curve(document, &elements, |_, curve| {
            duplicated += curve.duplicate_selected_keys();
        })?;
        tracing::debug!("Duplicated {} keys", duplicated);

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframesEdited)
    }

    fn invoke(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        let status = self.exec(ctx)?;
        if status == OperatorStatus::Finished {
            ctx.interactions.push(Interaction::TimeTranslate);
        }
        Ok(status)
    }
}

/// Remove the selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteKeys;

impl KeyframeOperator for DeleteKeys {
    fn idname(&self) -> &'static str {
        "action.delete"
    }

    fn name(&self) -> &'static str {
        "Delete Keyframes"
    }

    fn description(&self) -> &'static str {
        "Remove all selected keyframes"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        let elements = ctx.filter(editable_curves());
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut deleted = 0;
        for_each_curve(document, &elements, |_, curve| {
            deleted += curve.delete_selected_keys();
        })?;
        tracing::debug!("Deleted {} keys", deleted);

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframesEdited)
    }

    fn invoke(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if !ctx.confirm("Delete selected keyframes?") {
            return Ok(OperatorStatus::Cancelled);
        }
        self.exec(ctx)
    }
}

/// Default clean threshold
fn default_threshold() -> f32 {
    0.001
}

/// Remove keys that do not change the curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanKeys {
    /// Value difference below which keys count as redundant
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

impl Default for CleanKeys {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl KeyframeOperator for CleanKeys {
    fn idname(&self) -> &'static str {
        "action.clean"
    }

    fn name(&self) -> &'static str {
        "Clean Keyframes"
    }

    fn description(&self) -> &'static str {
        "Simplify F-Curves by removing closely spaced keyframes"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if self.threshold.is_nan() || self.threshold < 0.0 {
            return Err(OperatorError::InvalidParameter {
                name: "threshold",
                reason: format!("must be zero or positive, got {}", self.threshold),
            });
        }
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::PassThrough);
        }

        let elements = ctx.filter(editable_curves() | FilterFlags::SELECTED);
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut removed = 0;
        for_each_curve(document, &elements, |_, curve| {
            removed += clean_curve(curve, self.threshold);
        })?;
        tracing::debug!("Clean removed {} keys", removed);

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframesEdited)
    }
}

/// Bake curves onto whole frames between selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleKeys;

impl KeyframeOperator for SampleKeys {
    fn idname(&self) -> &'static str {
        "action.sample"
    }

    fn name(&self) -> &'static str {
        "Sample Keyframes"
    }

    fn description(&self) -> &'static str {
        "Add keyframes on every frame between the selected keyframes"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::PassThrough);
        }

        let elements = ctx.filter(editable_curves());
        let defaults = ctx.settings.key_defaults();
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut added = 0;
        for_each_curve(document, &elements, |_, curve| {
            added += sample_curve(curve, &defaults);
        })?;
        tracing::debug!("Sample added {} keys", added);

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframesEdited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copybuf::CopyBuffer;
    use crate::filter::ContentKind;
    use crate::operators::test_support::{fixture, linear};
    use crate::operators::{run_operator, CallMode};
    use crate::scene::Scene;
    use crate::settings::KeyframeSettings;
    use ordoplay_editor_curves::{KeySelect, Keyframe};

    #[test]
    fn test_copy_paste_round_trip() {
        let mut f = fixture();
        let before = f.doc.clone();
        let mut scene = Scene {
            current_frame: 0,
            ..Scene::default()
        };
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer).with_scene(&mut scene);

        assert_eq!(CopyKeys.exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        assert!(ctx.reports.is_empty());
        let paste = PasteKeys {
            offset: PasteOffset::None,
        };
        assert_eq!(paste.exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        drop(ctx);

        assert_eq!(f.curve(f.main).points, before.curve(f.block, f.main).unwrap().points);
        assert_eq!(buffer.items().len(), 1);
    }

    #[test]
    fn test_copy_nothing_selected_reports() {
        let mut f = fixture();
        let main = f.main;
        f.curve_mut(main).flags.selected = false;
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);

        assert_eq!(CopyKeys.exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        assert!(ctx.reports.contains("No keyframes copied to copy-paste buffer"));
    }

    #[test]
    fn test_paste_empty_buffer_reports() {
        let mut f = fixture();
        let before = f.doc.clone();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);

        assert_eq!(PasteKeys::default().exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        assert!(ctx.reports.contains("Nothing to paste, as Copy-Paste buffer was empty"));
        drop(ctx);
        assert_eq!(f.doc, before);
    }

    #[test]
    fn test_paste_offsets_to_current_frame() {
        let mut f = fixture();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut scene = Scene {
            current_frame: 100,
            ..Scene::default()
        };
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer).with_scene(&mut scene);
        CopyKeys.exec(&mut ctx).unwrap();
        PasteKeys::default().exec(&mut ctx).unwrap();
        drop(ctx);

        assert_eq!(f.times(f.main), vec![0.0, 10.0, 20.0, 100.0, 110.0, 120.0]);
        // the scale curve animates a different property
        assert_eq!(f.times(f.other), vec![5.0, 15.0]);
    }

    #[test]
    fn test_insert_scopes() {
        let mut f = fixture();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut scene = Scene {
            current_frame: 7,
            ..Scene::default()
        };
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer).with_scene(&mut scene);
        let selected = InsertKeys {
            scope: InsertScope::Selected,
        };
        assert_eq!(selected.exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        drop(ctx);
        assert!(f.curve(f.main).key_at(7.0).is_some());
        assert!(f.curve(f.other).key_at(7.0).is_none());
        assert!((f.curve(f.main).key_at(7.0).unwrap().value() - 7.0).abs() < 1e-4);

        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer).with_scene(&mut scene);
        InsertKeys::default().exec(&mut ctx).unwrap();
        drop(ctx);
        assert!(f.curve(f.other).key_at(7.0).is_some());
    }

    #[test]
    fn test_insert_cancelled_for_strokes_and_without_scene() {
        let mut f = fixture();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);
        assert_eq!(InsertKeys::default().exec(&mut ctx).unwrap(), OperatorStatus::Cancelled);

        let mut scene = Scene::default();
        let mut ctx = ctx.with_scene(&mut scene).with_content(ContentKind::StrokeLayers);
        assert_eq!(InsertKeys::default().exec(&mut ctx).unwrap(), OperatorStatus::Cancelled);
    }

    #[test]
    fn test_duplicate_invoke_chains_translate() {
        let mut f = fixture();
        let main = f.main;
        f.curve_mut(main).points[1].select = KeySelect::NONE;
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);

        let status = run_operator(&DuplicateKeys, &mut ctx, CallMode::Invoke).unwrap();
        assert_eq!(status, OperatorStatus::Finished);
        assert_eq!(ctx.interactions, vec![Interaction::TimeTranslate]);
        drop(ctx);
        assert_eq!(f.times(f.main), vec![0.0, 0.0, 10.0, 20.0, 20.0]);
    }

    #[test]
    fn test_delete_all_keeps_empty_curve() {
        let mut f = fixture();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);
        assert_eq!(DeleteKeys.exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        drop(ctx);
        assert!(f.curve(f.main).is_empty());
        assert_eq!(f.doc.curve_count(), 2);
    }

    #[test]
    fn test_delete_invoke_asks_for_confirmation() {
        let mut f = fixture();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer).with_confirm(|_: &str| false);
        let status = run_operator(&DeleteKeys, &mut ctx, CallMode::Invoke).unwrap();
        assert_eq!(status, OperatorStatus::Cancelled);
        assert!(ctx.notifications.is_empty());
        drop(ctx);
        assert_eq!(f.curve(f.main).len(), 3);
    }

    #[test]
    fn test_clean_rejects_negative_threshold() {
        let mut f = fixture();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);
        let result = CleanKeys { threshold: -1.0 }.exec(&mut ctx);
        assert!(matches!(result, Err(OperatorError::InvalidParameter { name: "threshold", .. })));
    }

    #[test]
    fn test_clean_only_selected_channels() {
        let mut f = fixture();
        let (main, other) = (f.main, f.other);
        *f.curve_mut(main) = linear(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        f.curve_mut(main).id = main;
        f.curve_mut(main).flags.selected = true;
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);

        assert_eq!(CleanKeys::default().exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        drop(ctx);
        assert_eq!(f.times(main), vec![0.0, 2.0]);
        assert_eq!(f.times(other), vec![5.0, 15.0]);
    }

    #[test]
    fn test_sample_pass_through_for_strokes() {
        let mut f = fixture();
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer)
            .with_content(ContentKind::StrokeLayers);
        assert_eq!(SampleKeys.exec(&mut ctx).unwrap(), OperatorStatus::PassThrough);
        assert_eq!(CleanKeys::default().exec(&mut ctx).unwrap(), OperatorStatus::PassThrough);
    }

    #[test]
    fn test_sample_fills_frames() {
        let mut f = fixture();
        let other = f.other;
        f.curve_mut(other).points.iter_mut().for_each(Keyframe::deselect_all);
        let settings = KeyframeSettings::default();
        let mut buffer = CopyBuffer::new();
        let mut ctx = AnimContext::new(&mut f.doc, &settings, &mut buffer);
        assert_eq!(SampleKeys.exec(&mut ctx).unwrap(), OperatorStatus::Finished);
        drop(ctx);
        assert_eq!(f.curve(f.main).len(), 21);
        assert_eq!(f.curve(f.other).len(), 2);
    }
}
