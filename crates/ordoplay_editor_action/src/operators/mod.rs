// SPDX-License-Identifier: MIT OR Apache-2.0
//! User-invocable keyframe operators.
//!
//! Each operator is a small serde struct holding its parameters. The host
//! checks [`KeyframeOperator::poll`] and then runs either `exec` (scripted
//! and repeated calls) or `invoke` (interactive calls, which may prompt or
//! chain a follow-up interaction). See [`run_operator`].

pub mod attributes;
pub mod command;
pub mod keys;
pub mod transform;
pub mod view;

pub use attributes::{HandleTypeMode, SetExtrapolation, SetHandleType, SetInterpolation};
pub use command::{Command, OperatorInfo, OperatorRegistry};
pub use keys::{CleanKeys, CopyKeys, DeleteKeys, DuplicateKeys, InsertKeys, InsertScope, PasteKeys, SampleKeys};
pub use transform::{FrameJump, MirrorKeys, SnapKeys};
pub use view::{SetPreviewRange, ViewAll};

use crate::context::{AnimContext, Notification};
use crate::document::AnimDocument;
use crate::error::{OperatorError, Result};
use crate::filter::{ChannelRef, FilteredElement};
use bitflags::bitflags;
use ordoplay_editor_curves::FCurve;

bitflags! {
    /// Host integration flags of an operator
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperatorFlags: u8 {
        /// Shown in the operator history and can be repeated
        const REGISTER = 1;
        /// Pushes an undo step when it finishes
        const UNDO = 1 << 1;
    }
}

/// Outcome of an operator run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorStatus {
    /// The operator ran and changed (or deliberately kept) the data
    Finished,
    /// Nothing was done
    Cancelled,
    /// The operator does not handle this context; let another one try
    PassThrough,
}

/// How the host is calling an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Run directly with the stored parameters
    Exec,
    /// Interactive call from the user
    Invoke,
}

/// A keyframe editing operator
pub trait KeyframeOperator {
    /// Stable identifier, e.g. `action.snap`
    fn idname(&self) -> &'static str;

    /// Human readable label
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// Host integration flags
    fn flags(&self) -> OperatorFlags {
        OperatorFlags::REGISTER | OperatorFlags::UNDO
    }

    /// Whether the operator can run in this context
    fn poll(&self, ctx: &AnimContext<'_>) -> bool {
        ctx.document.is_some()
    }

    /// Run with the stored parameters
    fn exec(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus>;

    /// Run interactively
    fn invoke(&self, ctx: &mut AnimContext<'_>) -> Result<OperatorStatus> {
        self.exec(ctx)
    }
}

/// Run an operator the way the host does: poll first, then exec or invoke
pub fn run_operator(
    operator: &dyn KeyframeOperator,
    ctx: &mut AnimContext<'_>,
    mode: CallMode,
) -> Result<OperatorStatus> {
    if !operator.poll(ctx) {
        tracing::debug!("{} cannot run in this context", operator.idname());
        return Ok(OperatorStatus::Cancelled);
    }

    tracing::debug!("Running {} ({:?})", operator.idname(), mode);
    let status = match mode {
        CallMode::Exec => operator.exec(ctx)?,
        CallMode::Invoke => operator.invoke(ctx)?,
    };
    tracing::debug!("{} returned {:?}", operator.idname(), status);
    Ok(status)
}

/// Emit a notification and report success
pub(crate) fn finish(ctx: &mut AnimContext<'_>, notification: Notification) -> Result<OperatorStatus> {
    ctx.notify(notification);
    Ok(OperatorStatus::Finished)
}

/// Apply `edit` to each curve among `elements`
///
/// Stroke layers and header rows are skipped. Returns the number of curves
/// visited, or an error when an element names a curve that is gone.
pub(crate) fn for_each_curve(
    document: &mut AnimDocument,
    elements: &[FilteredElement],
    mut edit: impl FnMut(&FilteredElement, &mut FCurve),
) -> Result<usize> {
    let mut visited = 0;
    for element in elements {
        let Some((block, curve_id)) = element.curve_key() else {
            if let ChannelRef::StrokeLayer(layer) = element.channel {
                tracing::trace!("Skipping stroke layer {:?}", layer);
            }
            continue;
        };
        let curve = document
            .curve_mut(block, curve_id)
            .ok_or(OperatorError::CurveNotFound {
                block: Some(block),
                curve: curve_id,
            })?;
        edit(element, curve);
        visited += 1;
    }
    Ok(visited)
}
