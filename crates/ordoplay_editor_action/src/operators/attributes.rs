// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operators changing key and curve attributes.

use super::{finish, for_each_curve, KeyframeOperator, OperatorStatus};
use crate::context::{AnimContext, Notification};
use crate::edit::{self, visit_keys, AfterEdit, KeyFilter, NotFreeCheck};
use crate::error::Result;
use crate::filter::FilterFlags;
use crate::general::refresh_curves;
use ordoplay_editor_curves::{Extrapolation, HandleType, Interpolation};
use serde::{Deserialize, Serialize};

fn editable_curves() -> FilterFlags {
    FilterFlags::VISIBLE | FilterFlags::FOR_EDIT | FilterFlags::CURVES_ONLY
}

/// Set the extrapolation of every editable curve
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetExtrapolation {
    /// New extrapolation
    pub mode: Extrapolation,
}

impl KeyframeOperator for SetExtrapolation {
    fn idname(&self) -> &'static str {
        "action.extrapolation_type"
    }

    fn name(&self) -> &'static str {
        "Set Keyframe Extrapolation"
    }

    fn description(&self) -> &'static str {
        "Set extrapolation mode for selected F-Curves"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::PassThrough);
        }
        let elements = ctx.filter(editable_curves() | FilterFlags::SELECTED);
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mode = self.mode;
        let changed = for_each_curve(document, &elements, |_, curve| curve.extrapolation = mode)?;
        tracing::debug!("{} on {} curves", mode.name(), changed);
        finish(ctx, Notification::KeyframeSettingsChanged)
    }
}

/// Set the interpolation of the selected keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetInterpolation {
    /// New interpolation
    pub mode: Interpolation,
}

impl KeyframeOperator for SetInterpolation {
    fn idname(&self) -> &'static str {
        "action.interpolation_type"
    }

    fn name(&self) -> &'static str {
        "Set Keyframe Interpolation"
    }

    fn description(&self) -> &'static str {
        "Set interpolation mode for the F-Curve segments starting from the selected keyframes"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::PassThrough);
        }
        let elements = ctx.filter(editable_curves());
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mut visitor = edit::SetInterpolation(self.mode);
        for_each_curve(document, &elements, |_, curve| {
            visit_keys(curve, KeyFilter::Selected, &mut visitor, AfterEdit::Nothing);
        })?;

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframeSettingsChanged)
    }
}

/// Handle type choices, including toggling between free and aligned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HandleTypeMode {
    /// Auto handles
    #[default]
    Auto,
    /// Vector handles
    Vector,
    /// Free handles
    Free,
    /// Aligned handles
    Aligned,
    /// Free when any selected handle is not free, aligned otherwise
    Toggle,
}

impl HandleTypeMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => HandleType::Auto.name(),
            Self::Vector => HandleType::Vector.name(),
            Self::Free => HandleType::Free.name(),
            Self::Aligned => HandleType::Aligned.name(),
            Self::Toggle => "Toggle Free/Aligned",
        }
    }
}

/// Set the handle type of the selected handles
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SetHandleType {
    /// New handle type
    pub mode: HandleTypeMode,
}

impl KeyframeOperator for SetHandleType {
    fn idname(&self) -> &'static str {
        "action.handle_type"
    }

    fn name(&self) -> &'static str {
        "Set Keyframe Handle Type"
    }

    fn description(&self) -> &'static str {
        "Set type of handle for selected keyframes"
    }

    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        if ctx.is_stroke_layers() {
            return Ok(OperatorStatus::PassThrough);
        }
        let elements = ctx.filter(editable_curves());
        let Some(document) = ctx.document.as_deref_mut() else {
            return Ok(OperatorStatus::Cancelled);
        };

        let mode = self.mode;
        for_each_curve(document, &elements, |_, curve| {
            let handle_type = match mode {
                HandleTypeMode::Auto => HandleType::Auto,
                HandleTypeMode::Vector => HandleType::Vector,
                HandleTypeMode::Free => HandleType::Free,
                HandleTypeMode::Aligned => HandleType::Aligned,
                HandleTypeMode::Toggle => {
                    if visit_keys(curve, KeyFilter::Selected, &mut NotFreeCheck, AfterEdit::Nothing) {
                        HandleType::Free
                    } else {
                        HandleType::Aligned
                    }
                }
            };
            visit_keys(
                curve,
                KeyFilter::Selected,
                &mut edit::SetHandleType(handle_type),
                AfterEdit::Nothing,
            );
        })?;

        refresh_curves(document, &elements);
        finish(ctx, Notification::KeyframeSettingsChanged)
    }
}
