// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the action editor.

use crate::document::DataBlockId;
use ordoplay_editor_curves::CurveId;
use thiserror::Error;

/// Errors raised while running a keyframe operator
#[derive(Debug, Error)]
pub enum OperatorError {
    /// A filtered channel points at a curve that no longer exists
    #[error("Curve not found: {curve:?} in data block {block:?}")]
    CurveNotFound {
        /// Owning data block
        block: Option<DataBlockId>,
        /// Missing curve
        curve: CurveId,
    },

    /// An operator parameter is out of range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Unknown operator identifier
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
}

/// Result type for operator execution
pub type Result<T> = std::result::Result<T, OperatorError>;

/// Errors raised while loading or saving keyframe settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),

    /// The settings file was written by a newer editor
    #[error("Unsupported settings version {found} (expected at most {supported})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}
