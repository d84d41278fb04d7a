// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operators fitting the preview range and the view to the keys.

use super::{finish, KeyframeOperator, OperatorStatus};
use crate::context::{AnimContext, Notification};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Set the scene preview range to the range of the selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetPreviewRange;

impl KeyframeOperator for SetPreviewRange {
    fn idname(&self) -> &'static str {
        "action.set_preview_range"
    }

    fn name(&self) -> &'static str {
        "Auto-Set Preview Range"
    }

    fn description(&self) -> &'static str {
        "Set Preview Range based on extents of selected Keyframes"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        let (min, max) = ctx.keyframe_extents();
        let Some(scene) = ctx.scene.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let range = ((min + 0.5).floor() as i32, (max + 0.5).floor() as i32);
        scene.preview_range = Some(range);
        tracing::debug!("Preview range set to {:?}", range);
        finish(ctx, Notification::SceneFrameChanged)
    }
}

/// Fit the view horizontally to the selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewAll;

impl KeyframeOperator for ViewAll {
    fn idname(&self) -> &'static str {
        "action.view_all"
    }

    fn name(&self) -> &'static str {
        "View All"
    }

    fn description(&self) -> &'static str {
        "Reset viewable area to show full keyframe range"
    }

    fn flags(&self) -> super::OperatorFlags {
        super::OperatorFlags::REGISTER
    }

    fn poll(&self, ctx: &AnimContext<'_>) -> bool {
        ctx.document.is_some() && ctx.view.is_some()
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        let (min, max) = ctx.keyframe_extents();
        let padding = (max - min) * ctx.settings.view_padding;
        let Some(view) = ctx.view.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        view.fit_frames(min - padding, max + padding);
        finish(ctx, Notification::ViewChanged)
    }
}
