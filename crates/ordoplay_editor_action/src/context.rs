// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution context handed to keyframe operators.

use crate::copybuf::CopyBuffer;
use crate::document::{AnimDocument, DataBlockId};
use crate::filter::{filter_channels, ContentKind, FilterFlags, FilteredElement};
use crate::scene::{Scene, View2D};
use crate::settings::KeyframeSettings;

/// Change notifications emitted by finished operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// Key times or values changed
    KeyframesEdited,
    /// Key attributes (interpolation, handles, extrapolation) changed
    KeyframeSettingsChanged,
    /// The scene frame or preview range changed
    SceneFrameChanged,
    /// The editor view moved
    ViewChanged,
}

/// Follow-up interaction an operator asks the host to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Move the selected keys in time with the pointer
    TimeTranslate,
}

/// Severity of a user-facing report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    /// Informational
    Info,
    /// Something the user asked for could not be done
    Warning,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Severity
    pub level: ReportLevel,
    /// Message text
    pub message: String,
}

/// Messages collected while operators run
#[derive(Debug, Clone, Default)]
pub struct Reports {
    entries: Vec<Report>,
}

impl Reports {
    /// Record an informational message
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.entries.push(Report {
            level: ReportLevel::Info,
            message,
        });
    }

    /// Record a warning
    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.entries.push(Report {
            level: ReportLevel::Warning,
            message,
        });
    }

    /// Recorded messages, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.entries.iter()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether a message with this exact text was reported
    pub fn contains(&self, message: &str) -> bool {
        self.entries.iter().any(|r| r.message == message)
    }

    /// Take all messages, leaving the list empty
    pub fn take(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.entries)
    }
}

/// Reads the live value of an animated property
///
/// Keys inserted on curves bound to a property take their value from here
/// instead of from the curve itself.
pub trait PropertyResolver {
    /// Current value of a property component
    fn property_value(&self, block: DataBlockId, rna_path: &str, array_index: usize) -> Option<f32>;

    /// Evaluated (visual) value of a property component
    fn visual_value(&self, block: DataBlockId, rna_path: &str, array_index: usize) -> Option<f32> {
        self.property_value(block, rna_path, array_index)
    }
}

/// Asks the user to confirm a destructive operation
pub type ConfirmFn<'a> = Box<dyn FnMut(&str) -> bool + 'a>;

/// Everything an operator may read or change
pub struct AnimContext<'a> {
    /// Animation data, absent when the editor shows nothing
    pub document: Option<&'a mut AnimDocument>,
    /// Scene timeline
    pub scene: Option<&'a mut Scene>,
    /// Editor view
    pub view: Option<&'a mut View2D>,
    /// What the editor lists
    pub content: ContentKind,
    /// Keyframe editing preferences
    pub settings: &'a KeyframeSettings,
    /// Shared copy/paste buffer
    pub copy_buffer: &'a mut CopyBuffer,
    /// Live property values for bound curves
    pub properties: Option<&'a dyn PropertyResolver>,
    /// Confirmation prompt used by interactive invocations
    pub confirm: Option<ConfirmFn<'a>>,
    /// Messages for the user
    pub reports: Reports,
    /// Notifications emitted so far
    pub notifications: Vec<Notification>,
    /// Follow-up interactions requested so far
    pub interactions: Vec<Interaction>,
}

impl<'a> AnimContext<'a> {
    /// Create a context over a document
    pub fn new(
        document: &'a mut AnimDocument,
        settings: &'a KeyframeSettings,
        copy_buffer: &'a mut CopyBuffer,
    ) -> Self {
        Self {
            document: Some(document),
            ..Self::empty(settings, copy_buffer)
        }
    }

    /// Create a context with no animation data
    pub fn empty(settings: &'a KeyframeSettings, copy_buffer: &'a mut CopyBuffer) -> Self {
        Self {
            document: None,
            scene: None,
            view: None,
            content: ContentKind::default(),
            settings,
            copy_buffer,
            properties: None,
            confirm: None,
            reports: Reports::default(),
            notifications: Vec::new(),
            interactions: Vec::new(),
        }
    }

    /// Attach a scene
    pub fn with_scene(mut self, scene: &'a mut Scene) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Attach an editor view
    pub fn with_view(mut self, view: &'a mut View2D) -> Self {
        self.view = Some(view);
        self
    }

    /// Set what the editor lists
    pub fn with_content(mut self, content: ContentKind) -> Self {
        self.content = content;
        self
    }

    /// Attach a property resolver
    pub fn with_properties(mut self, properties: &'a dyn PropertyResolver) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Attach a confirmation prompt
    pub fn with_confirm(mut self, confirm: impl FnMut(&str) -> bool + 'a) -> Self {
        self.confirm = Some(Box::new(confirm));
        self
    }

    /// Channels of the document passing `flags`
    ///
    /// Strip time mappings are attached when the settings ask for them.
    pub fn filter(&self, flags: FilterFlags) -> Vec<FilteredElement> {
        match self.document.as_deref() {
            Some(document) => {
                filter_channels(document, self.content, flags, self.settings.nla_time_mapping)
            }
            None => Vec::new(),
        }
    }

    /// Whether this context lists stroke layers rather than curves
    pub fn is_stroke_layers(&self) -> bool {
        self.content == ContentKind::StrokeLayers
    }

    /// Emit a change notification
    pub fn notify(&mut self, notification: Notification) {
        tracing::trace!("Notify {:?}", notification);
        self.notifications.push(notification);
    }

    /// Ask the user to confirm; contexts without a prompt confirm everything
    pub fn confirm(&mut self, message: &str) -> bool {
        match self.confirm.as_mut() {
            Some(confirm) => confirm(message),
            None => true,
        }
    }
}
