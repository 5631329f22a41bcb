// src/models.rs

use crate::constants::actions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

// --- ACTION MODELS ---
// What a menu entry asks the application to do, and what the application
// reports back about it.

/// Records which part of the application built an [`ActionRequest`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestOrigin {
    /// Built internally, e.g. by a collaborator.
    #[default]
    Internal,
    /// Built from a menu definition or by menu expansion.
    Menu,
    /// Built from a toolbar definition.
    Toolbar,
    /// Built by the keyboard binder.
    Keyboard,
}

/// An action identifier paired with its string argument.
///
/// Two requests are equal when their action and argument are equal; the
/// origin is bookkeeping and does not take part in comparisons.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ActionRequest {
    /// The action identifier, e.g. `file-open`.
    pub action: String,
    /// The argument handed to the action. Empty when the action takes none.
    #[serde(default)]
    pub argument: String,
    /// Who built this request.
    #[serde(default)]
    pub origin: RequestOrigin,
}

impl ActionRequest {
    /// Creates a request originating from the menu subsystem.
    pub fn new(action: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            argument: argument.into(),
            origin: RequestOrigin::Menu,
        }
    }

    /// The request carried by disabled placeholder entries.
    pub fn noaction() -> Self {
        Self::new(actions::NOACTION, "")
    }

    /// Splits a textual command (`"name arg..."`) into action and argument.
    /// The argument is everything after the first run of whitespace.
    pub fn from_command(command: &str) -> Self {
        let command = command.trim();
        match command.split_once(char::is_whitespace) {
            Some((action, argument)) => Self::new(action, argument.trim_start()),
            None => Self::new(command, ""),
        }
    }

    /// Returns a copy of this request tagged with another origin.
    pub fn with_origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// True for the placeholder request.
    pub fn is_noaction(&self) -> bool {
        self.action == actions::NOACTION
    }
}

impl PartialEq for ActionRequest {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action && self.argument == other.argument
    }
}

impl Eq for ActionRequest {}

impl Hash for ActionRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.action.hash(state);
        self.argument.hash(state);
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.argument.is_empty() {
            write!(f, "{}", self.action)
        } else {
            write!(f, "{} {}", self.action, self.argument)
        }
    }
}

/// Whether a command can currently run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    /// The action registry does not know the command.
    #[default]
    Unknown,
    /// The command can run.
    Enabled,
    /// The command exists but cannot run in the current context.
    Disabled,
}

/// The status of a command: availability plus, for checkable commands, its
/// on/off state.
///
/// Templates always carry the default (unknown) status; only expanded
/// entries carry a queried one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FuncStatus {
    /// Whether the command can run.
    pub availability: Availability,
    /// `Some(state)` for checkable commands.
    pub checked: Option<bool>,
}

impl FuncStatus {
    /// An enabled, non-checkable status.
    pub fn enabled() -> Self {
        Self {
            availability: Availability::Enabled,
            checked: None,
        }
    }

    /// A disabled, non-checkable status.
    pub fn disabled() -> Self {
        Self {
            availability: Availability::Disabled,
            checked: None,
        }
    }

    /// Sets the checkable on/off state.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Enables or disables a known status.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.availability = if enabled {
            Availability::Enabled
        } else {
            Availability::Disabled
        };
    }

    /// True if the action registry did not recognise the command.
    pub fn is_unknown(&self) -> bool {
        self.availability == Availability::Unknown
    }

    /// True if the command can run.
    pub fn is_enabled(&self) -> bool {
        self.availability == Availability::Enabled
    }
}

// --- DATA SOURCE MODELS ---
// Read-only records handed to the expansion engine by its collaborators.

/// A valid bookmark slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// The slot number, starting at 1.
    pub slot: usize,
    /// The file the bookmark points into.
    pub path: PathBuf,
}

/// A document in the open-document ring.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OpenDocument {
    /// Absolute path of the document.
    pub path: PathBuf,
    /// False when the document has unsaved changes.
    #[serde(default = "default_true")]
    pub clean: bool,
}

/// A file format known to the format registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Format {
    /// Internal name, used as the action argument.
    pub name: String,
    /// Human readable name, used as the entry label.
    pub pretty_name: String,
    /// Accelerator hint; empty for none.
    #[serde(default)]
    pub shortcut: String,
    /// Dummy formats are never listed.
    #[serde(default)]
    pub dummy: bool,
    /// Only document formats are offered for view/update/export.
    #[serde(default = "default_true")]
    pub document_format: bool,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            name: String::new(),
            pretty_name: String::new(),
            shortcut: String::new(),
            dummy: false,
            document_format: true,
        }
    }
}

/// A float type registered by the document class.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FloatType {
    /// The float type, e.g. `figure`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name of one float, e.g. `Figure`.
    pub name: String,
    /// Display name of the list of floats, e.g. `List of Figures`.
    pub list_name: String,
}

/// An inset layout registered by the document class.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InsetLayout {
    /// Layout name, used as both label and action argument.
    pub name: String,
    /// Family tag, e.g. `charstyle` or `custom`.
    pub family: String,
}

/// A toolbar known to the toolbar registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolbarInfo {
    /// Internal name, used as the action argument.
    pub name: String,
    /// Display name.
    pub gui_name: String,
    /// The toolbar shows and hides itself automatically.
    #[serde(default)]
    pub auto: bool,
    /// The toolbar is currently shown.
    #[serde(default)]
    pub visible: bool,
}

/// One line of a document's table of contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TocItem {
    /// Nesting depth; smaller is closer to the top.
    pub depth: i32,
    /// Display text.
    pub text: String,
    /// What selecting the item does.
    pub action: ActionRequest,
}

/// One table-of-contents list, either the headings or one float type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TocList {
    /// List type: `tableofcontents` or a float type.
    pub kind: String,
    /// Items in document order.
    pub items: Vec<TocItem>,
}

fn default_true() -> bool {
    true
}
