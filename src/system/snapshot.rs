//! A static, TOML-described stand-in for the application state that menus are
//! expanded against: session history, open documents, formats, toolbars, the
//! clipboard and the current document, plus command statuses and key
//! bindings. Implements every collaborator trait of
//! [`ExpansionContext`](crate::core::context::ExpansionContext).

use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::actions,
    core::context::{
        ActionRegistry, BufferList, ClipboardHistory, Document, ExpansionContext,
        FormatRegistry, SessionSource, ShortcutRegistry, ToolbarRegistry,
    },
    models::{
        ActionRequest, Availability, Bookmark, FloatType, Format, FuncStatus, InsetLayout,
        OpenDocument, TocList, ToolbarInfo,
    },
};

/// Failures loading a context snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("Could not read context snapshot '{path}': {source}")]
    Read {
        /// Path of the snapshot.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The snapshot is not valid TOML for this schema.
    #[error("Invalid context snapshot '{path}': {source}")]
    Parse {
        /// Path of the snapshot.
        path: String,
        /// The TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Command statuses. Commands are matched by their full text
/// (`"buffer-export pdf"`) or by action name alone (`"buffer-export"`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ActionTable {
    /// Availability of commands not listed anywhere.
    pub default: Availability,
    /// Commands that can run.
    pub enabled: Vec<String>,
    /// Commands that exist but cannot run.
    pub disabled: Vec<String>,
    /// Commands the application does not know.
    pub unknown: Vec<String>,
    /// Checkable commands currently switched on.
    pub checked: Vec<String>,
}

impl Default for ActionTable {
    fn default() -> Self {
        Self {
            default: Availability::Enabled,
            enabled: Vec::new(),
            disabled: Vec::new(),
            unknown: Vec::new(),
            checked: Vec::new(),
        }
    }
}

fn listed(list: &[String], request: &ActionRequest) -> bool {
    let full = request.to_string();
    list.iter().any(|c| *c == full || *c == request.action)
}

impl ActionRegistry for ActionTable {
    fn status_of(&self, request: &ActionRequest) -> FuncStatus {
        let availability = if listed(&self.unknown, request) {
            Availability::Unknown
        } else if listed(&self.disabled, request) {
            Availability::Disabled
        } else if listed(&self.enabled, request) {
            Availability::Enabled
        } else {
            self.default
        };
        let status = FuncStatus {
            availability,
            checked: None,
        };
        if listed(&self.checked, request) {
            status.with_checked(true)
        } else {
            status
        }
    }
}

/// The current document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DocumentSnapshot {
    /// Table-of-contents lists.
    pub toc: Vec<TocList>,
    /// Float types of the document class.
    pub float_types: Vec<FloatType>,
    /// Inset layouts of the document class.
    pub inset_layouts: Vec<InsetLayout>,
    /// Branches of the master document.
    pub branches: Vec<String>,
    /// Formats the document can be exported to.
    pub export_formats: Vec<Format>,
    /// Names of the export formats that can also be viewed.
    pub viewable: Vec<String>,
    /// Path of the master document, for child documents.
    pub master: Option<PathBuf>,
}

impl Document for DocumentSnapshot {
    fn toc_lists(&self) -> Vec<TocList> {
        self.toc.clone()
    }

    fn float_types(&self) -> Vec<FloatType> {
        self.float_types.clone()
    }

    fn inset_layouts(&self) -> Vec<InsetLayout> {
        self.inset_layouts.clone()
    }

    fn branches(&self) -> Vec<String> {
        self.branches.clone()
    }

    fn exportable_formats(&self, viewable_only: bool) -> Vec<Format> {
        self.export_formats
            .iter()
            .filter(|f| !viewable_only || self.viewable.contains(&f.name))
            .cloned()
            .collect()
    }

    fn master_link(&self) -> Option<ActionRequest> {
        self.master.as_ref().map(|path| {
            ActionRequest::new(actions::BUFFER_SWITCH, path.display().to_string())
        })
    }
}

/// Everything a menu can be expanded against, as plain data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ContextSnapshot {
    /// Recently opened files, most recent first.
    pub last_files: Vec<PathBuf>,
    /// Valid bookmarks.
    pub bookmarks: Vec<Bookmark>,
    /// The open-document ring.
    pub open_documents: Vec<OpenDocument>,
    /// Importable formats.
    pub import_formats: Vec<Format>,
    /// Registered toolbars.
    pub toolbars: Vec<ToolbarInfo>,
    /// Clipboard history, most recent first.
    pub clipboard: Vec<String>,
    /// The current document.
    pub document: Option<DocumentSnapshot>,
    /// Command statuses.
    pub actions: ActionTable,
    /// Key bindings by command text.
    pub bindings: BTreeMap<String, Vec<String>>,
    /// Commands the platform shows elsewhere, left out of every menu.
    pub exclude: Vec<String>,
}

impl ContextSnapshot {
    /// Loads a snapshot from a TOML file.
    pub fn load(path: &Path) -> SnapshotResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| SnapshotError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Parses a snapshot from TOML text. `origin` names the text in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> SnapshotResult<Self> {
        let snapshot: Self = toml::from_str(content).map_err(|e| SnapshotError::Parse {
            path: origin.to_string(),
            source: e,
        })?;
        log::debug!(
            "Loaded context '{}': {} last files, {} open documents, document: {}.",
            origin,
            snapshot.last_files.len(),
            snapshot.open_documents.len(),
            snapshot.document.is_some()
        );
        Ok(snapshot)
    }

    /// The expansion context backed by this snapshot.
    pub fn context(&self) -> ExpansionContext<'_> {
        ExpansionContext {
            actions: &self.actions,
            shortcuts: self,
            session: self,
            buffers: self,
            formats: self,
            toolbars: self,
            clipboard: self,
            document: self.document.as_ref().map(|d| d as &dyn Document),
        }
    }
}

impl ShortcutRegistry for ContextSnapshot {
    fn bindings_of(&self, request: &ActionRequest) -> Vec<String> {
        self.bindings
            .get(&request.to_string())
            .or_else(|| self.bindings.get(&request.action))
            .cloned()
            .unwrap_or_default()
    }
}

impl SessionSource for ContextSnapshot {
    fn last_files(&self) -> Vec<PathBuf> {
        self.last_files.clone()
    }

    fn bookmarks(&self) -> Vec<Bookmark> {
        self.bookmarks.clone()
    }
}

impl BufferList for ContextSnapshot {
    fn open_documents(&self) -> Vec<OpenDocument> {
        self.open_documents.clone()
    }
}

impl FormatRegistry for ContextSnapshot {
    fn importable_formats(&self) -> Vec<Format> {
        self.import_formats.clone()
    }
}

impl ToolbarRegistry for ContextSnapshot {
    fn toolbars(&self) -> Vec<ToolbarInfo> {
        self.toolbars.clone()
    }
}

impl ClipboardHistory for ContextSnapshot {
    fn recent_selections(&self) -> Vec<String> {
        self.clipboard.clone()
    }
}
