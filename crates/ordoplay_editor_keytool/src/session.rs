// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session files: the document, scene and view the commands run against.

use anyhow::{Context, Result};
use ordoplay_editor_action::{AnimDocument, Command, ContentKind, Scene, View2D};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a command list needs, stored as RON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Animation data
    pub document: AnimDocument,
    /// Scene timeline
    pub scene: Scene,
    /// Editor view
    pub view: View2D,
    /// What the editor lists
    pub content: ContentKind,
}

impl Session {
    /// Load a session file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session {}", path.display()))?;
        ron::from_str(&content).with_context(|| format!("Failed to parse session {}", path.display()))
    }

    /// Save the session as pretty RON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize session")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write session {}", path.display()))
    }
}

/// Load a RON list of commands
pub fn load_commands(path: &Path) -> Result<Vec<Command>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read commands {}", path.display()))?;
    ron::from_str(&content).with_context(|| format!("Failed to parse commands {}", path.display()))
}
