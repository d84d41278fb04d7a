// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe editing preferences.
//!
//! Stored as RON next to the other editor settings:
//! - Attributes of newly inserted keys
//! - Insert-key behaviour ("only needed", visual keying)
//! - Time mapping through owning-object strips
//! - View fitting and fallback frame range

use crate::error::SettingsError;
use ordoplay_editor_curves::{HandleType, Interpolation, KeyDefaults};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "keyframes.ron";

/// Keyframe editing preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeSettings {
    /// Settings format version
    pub version: u32,
    /// Interpolation given to inserted keys
    pub new_key_interpolation: Interpolation,
    /// Handle type given to inserted keys
    pub new_key_handle_type: HandleType,
    /// Skip inserting keys that would not change the curve
    pub insert_needed: bool,
    /// Key the visual (evaluated transform) value instead of the raw property
    pub insert_visual: bool,
    /// Remap curve time through the owning object's strip
    pub nla_time_mapping: bool,
    /// Fraction of the key range added on each side by view-all
    pub view_padding: f32,
    /// Range used when there is neither a keyed channel nor a scene
    pub fallback_range: (f32, f32),
}

impl Default for KeyframeSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            new_key_interpolation: Interpolation::Bezier,
            new_key_handle_type: HandleType::Auto,
            insert_needed: false,
            insert_visual: false,
            nla_time_mapping: true,
            view_padding: 0.1,
            fallback_range: (-5.0, 100.0),
        }
    }
}

impl KeyframeSettings {
    /// Attributes for keys created by insertion
    pub fn key_defaults(&self) -> KeyDefaults {
        KeyDefaults {
            interpolation: self.new_key_interpolation,
            handle_type: self.new_key_handle_type,
        }
    }

    /// Parse settings from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self, SettingsError> {
        let settings: KeyframeSettings = ron::from_str(content)?;
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }
        Ok(settings)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .depth_limit(3)
            .separate_tuple_members(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron_str(&content)?;
        tracing::debug!("Loaded keyframe settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = self.to_ron_string()?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved keyframe settings to {:?}", path);
        Ok(())
    }
}
