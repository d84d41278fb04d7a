// SPDX-License-Identifier: MIT OR Apache-2.0
//! Action editor keyframe operators for OrdoPlay Editor.
//!
//! This crate provides the editing commands of the dope sheet / action
//! editor:
//! - Channel filtering over data blocks, groups, curves and stroke layers
//! - Strip time mapping between action and scene time
//! - Per-key edits (snap, mirror, interpolation, handle types)
//! - Whole-curve edits (clean, sample, insert, duplicate, delete)
//! - The keyframe copy/paste buffer
//! - Key range calculation for preview range and view fitting
//!
//! ## Architecture
//!
//! Operators run against an [`AnimContext`]:
//! - the filter turns the context into a list of channels
//! - the edit engine applies a visitor to each curve's keys
//! - the touched curves are sorted and their handles recalculated
//! - one notification is recorded for the host to act on

pub mod context;
pub mod copybuf;
pub mod document;
pub mod edit;
pub mod error;
pub mod extents;
pub mod filter;
pub mod general;
pub mod nla;
pub mod operators;
pub mod scene;
pub mod settings;

pub use context::{AnimContext, Interaction, Notification, PropertyResolver, Report, ReportLevel, Reports};
pub use copybuf::{CopyBuffer, CopyBufferItem, CurveIdentity, PasteOffset};
pub use document::{Action, AnimDocument, ChannelFlags, ChannelGroup, DataBlock, DataBlockId, LayerId, StrokeFrame, StrokeLayer};
pub use edit::{EditData, EditFlow, KeyframeVisitor, MirrorMode, SnapMode};
pub use error::{OperatorError, SettingsError};
pub use filter::{filter_channels, ChannelRef, ContentKind, FilterFlags, FilteredElement};
pub use nla::{NlaStrip, TimeMapping};
pub use operators::{run_operator, CallMode, Command, KeyframeOperator, OperatorRegistry, OperatorStatus};
pub use scene::{Scene, TimeMarker, View2D};
pub use settings::KeyframeSettings;
