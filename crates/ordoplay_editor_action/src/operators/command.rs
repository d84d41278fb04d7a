// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serializable operator calls and the operator registry.

use super::*;
use crate::error::OperatorError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A serializable operator call with its parameters
///
/// Command files (RON) hold a list of these, e.g.
/// `[Snap((mode: NearestFrame)), Clean((threshold: 0.01)), Delete]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// [`SetPreviewRange`]
    SetPreviewRange,
    /// [`ViewAll`]
    ViewAll,
    /// [`CopyKeys`]
    Copy,
    /// [`PasteKeys`]
    Paste(PasteKeys),
    /// [`InsertKeys`]
    Insert(InsertKeys),
    /// [`DuplicateKeys`]
    Duplicate,
    /// [`DeleteKeys`]
    Delete,
    /// [`CleanKeys`]
    Clean(CleanKeys),
    /// [`SampleKeys`]
    Sample,
    /// [`SetExtrapolation`]
    SetExtrapolation(SetExtrapolation),
    /// [`SetInterpolation`]
    SetInterpolation(SetInterpolation),
    /// [`SetHandleType`]
    SetHandleType(SetHandleType),
    /// [`FrameJump`]
    FrameJump,
    /// [`SnapKeys`]
    Snap(SnapKeys),
    /// [`MirrorKeys`]
    Mirror(MirrorKeys),
}

impl Command {
    /// Build the operator this command calls
    pub fn operator(&self) -> Box<dyn KeyframeOperator> {
        match self {
            Self::SetPreviewRange => Box::new(SetPreviewRange),
            Self::ViewAll => Box::new(ViewAll),
            Self::Copy => Box::new(CopyKeys),
            Self::Paste(op) => Box::new(*op),
            Self::Insert(op) => Box::new(*op),
            Self::Duplicate => Box::new(DuplicateKeys),
            Self::Delete => Box::new(DeleteKeys),
            Self::Clean(op) => Box::new(*op),
            Self::Sample => Box::new(SampleKeys),
            Self::SetExtrapolation(op) => Box::new(*op),
            Self::SetInterpolation(op) => Box::new(*op),
            Self::SetHandleType(op) => Box::new(*op),
            Self::FrameJump => Box::new(FrameJump),
            Self::Snap(op) => Box::new(*op),
            Self::Mirror(op) => Box::new(*op),
        }
    }

    /// Run this command through [`run_operator`]
    pub fn run(&self, ctx: &mut AnimContext<'_>, mode: CallMode) -> Result<OperatorStatus> {
        run_operator(self.operator().as_ref(), ctx, mode)
    }
}

/// Summary of a registered operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorInfo {
    /// Stable identifier
    pub idname: &'static str,
    /// Human readable label
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Host integration flags
    pub flags: OperatorFlags,
}

impl OperatorInfo {
    /// Names of the set flags, in declaration order
    pub fn flag_names(&self) -> Vec<&'static str> {
        self.flags.iter_names().map(|(name, _)| name).collect()
    }
}

/// Every keyframe operator with default parameters, in menu order
pub struct OperatorRegistry {
    operators: IndexMap<&'static str, Box<dyn KeyframeOperator>>,
}

impl OperatorRegistry {
    /// Register all keyframe operators
    pub fn new() -> Self {
        let operators: Vec<Box<dyn KeyframeOperator>> = vec![
            Box::new(SetPreviewRange),
            Box::new(ViewAll),
            Box::new(CopyKeys),
            Box::new(PasteKeys::default()),
            Box::new(InsertKeys::default()),
            Box::new(DuplicateKeys),
            Box::new(DeleteKeys),
            Box::new(CleanKeys::default()),
            Box::new(SampleKeys),
            Box::new(SetExtrapolation::default()),
            Box::new(SetInterpolation::default()),
            Box::new(SetHandleType::default()),
            Box::new(FrameJump),
            Box::new(SnapKeys::default()),
            Box::new(MirrorKeys::default()),
        ];

        Self {
            operators: operators.into_iter().map(|op| (op.idname(), op)).collect(),
        }
    }

    /// Look up an operator by identifier
    pub fn get(&self, idname: &str) -> Result<&dyn KeyframeOperator> {
        self.operators
            .get(idname)
            .map(|op| op.as_ref())
            .ok_or_else(|| OperatorError::UnknownOperator(idname.to_string()))
    }

    /// Summaries of all operators
    pub fn infos(&self) -> Vec<OperatorInfo> {
        self.operators
            .values()
            .map(|op| OperatorInfo {
                idname: op.idname(),
                name: op.name(),
                description: op.description(),
                flags: op.flags(),
            })
            .collect()
    }

    /// Number of registered operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Whether no operator is registered
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
