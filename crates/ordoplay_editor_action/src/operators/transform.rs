// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operators moving keys in time (and the current frame to the keys).
//!
//! Snap and mirror targets are scene frames. For curves played through a
//! strip the target is converted to action time; key times are only ever
//! written for the keys being moved.

use super::{finish, for_each_curve, KeyframeOperator, OperatorStatus};
use crate::context::{AnimContext, Notification};
use crate::edit::{
    visit_keys, AfterEdit, EditData, KeyFilter, MirrorMode, MirrorVisitor, SnapMode, SnapVisitor,
    TimeAverage,
};
use crate::error::Result;
use crate::filter::FilterFlags;
use crate::general::refresh_curves;
use serde::{Deserialize, Serialize};

fn editable_curves() -> FilterFlags {
    FilterFlags::VISIBLE | FilterFlags::FOR_EDIT | FilterFlags::CURVES_ONLY
}

/// Move the current frame to the average time of the selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameJump;

impl KeyframeOperator for FrameJump {
    fn idname(&self) -> &'static str {
        "action.frame_jump"
    }

    fn name(&self) -> &'static str {
        "Jump to Keyframes"
    }

    fn description(&self) -> &'static str {
        "Set the current frame to the average frame of the selected keyframes"
    }

    fn flags(&self) -> super::OperatorFlags {
        super::OperatorFlags::REGISTER
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.scene.is_none() {
            return Ok(OperatorStatus::Cancelled);
        }
        let elements = ctx.filter(FilterFlags::VISIBLE | FilterFlags::CURVES_ONLY);
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut average = TimeAverage::default();
        for_each_curve(document, &elements, |element, curve| {
            average.mapping = element.time_mapping;
            visit_keys(curve, KeyFilter::Selected, &mut average, AfterEdit::Nothing);
        })?;

        if let (Some(time), Some(scene)) = (average.average(), ctx.scene.as_deref_mut()) {
            scene.current_frame = (time + 0.5).floor() as i32;
            tracing::debug!("Jumped to frame {}", scene.current_frame);
        }
        finish(ctx, Notification::SceneFrameChanged)
    }
}

/// Snap the selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapKeys {
    /// Snap target
    pub mode: SnapMode,
}

impl KeyframeOperator for SnapKeys {
    fn idname(&self) -> &'static str {
        "action.snap"
    }

    fn name(&self) -> &'static str {
        "Snap Keys"
    }

    fn description(&self) -> &'static str {
        "Snap selected keyframes to the times specified"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        let needs_scene = matches!(self.mode, SnapMode::CurrentFrame | SnapMode::NearestMarker);
        let data = match ctx.scene.as_deref() {
            Some(scene) => EditData::from_scene(scene),
            None if needs_scene => return Ok(OperatorStatus::Cancelled),
            None => EditData::default(),
        };
        let fps = data.frames_per_second;
        if self.mode == SnapMode::NearestSecond && !(fps.is_finite() && fps > 0.0) {
            ctx.reports.warning(format!("Cannot snap to seconds at {fps} frames per second"));
            return Ok(OperatorStatus::Cancelled);
        }

        let elements = ctx.filter(editable_curves());
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut visitor = SnapVisitor {
            mode: self.mode,
            data: &data,
            mapping: None,
        };
        for_each_curve(document, &elements, |element, curve| {
            visitor.mapping = element.time_mapping;
            visit_keys(curve, KeyFilter::Selected, &mut visitor, AfterEdit::Nothing);
        })?;
        tracing::debug!("Snapped keys to {}", self.mode.name());

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframesEdited)
    }
}

/// Mirror the selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorKeys {
    /// Mirror axis
    pub mode: MirrorMode,
}

impl KeyframeOperator for MirrorKeys {
    fn idname(&self) -> &'static str {
        "action.mirror"
    }

    fn name(&self) -> &'static str {
        "Mirror Keys"
    }

    fn description(&self) -> &'static str {
        "Flip selected keyframes over the selected mirror line"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        let needs_scene = matches!(
            self.mode,
            MirrorMode::CurrentFrame | MirrorMode::FirstSelectedMarker
        );
        let data = match ctx.scene.as_deref() {
            Some(scene) => EditData::from_scene(scene),
            None if needs_scene => return Ok(OperatorStatus::Cancelled),
            None => EditData::default(),
        };
        if self.mode == MirrorMode::FirstSelectedMarker && data.marker_frame.is_none() {
            tracing::debug!("No selected marker to mirror over");
            return Ok(OperatorStatus::Cancelled);
        }

        let elements = ctx.filter(editable_curves());
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut visitor = MirrorVisitor {
            mode: self.mode,
            data: &data,
            mapping: None,
        };
        for_each_curve(document, &elements, |element, curve| {
            visitor.mapping = element.time_mapping;
            visit_keys(curve, KeyFilter::Selected, &mut visitor, AfterEdit::Nothing);
        })?;
        tracing::debug!("Mirrored keys over {}", self.mode.name());

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframesEdited)
    }
}
