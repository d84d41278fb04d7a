// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation curve model for OrdoPlay Editor.
//!
//! This crate provides the data the action editor operates on:
//! - Keyframe points with tangent handles and per-segment interpolation
//! - F-Curves with extrapolation, channel flags and property binding
//! - Curve evaluation (constant, linear, bezier)
//! - Handle recalculation after edits

pub mod keyframe;
pub mod curve;
pub mod eval;
pub mod handles;

pub use keyframe::{Keyframe, KeySelect, Interpolation, HandleType, Interp};
pub use curve::{FCurve, CurveId, CurveFlags, Extrapolation, KeyDefaults, KEY_TIME_THRESHOLD};
