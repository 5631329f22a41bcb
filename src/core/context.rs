//! # Expansion Context
//!
//! The collaborators the expansion engine queries. Each trait is a narrow,
//! read-only view of some application subsystem. The engine never writes
//! through them; it only turns what they report into menu entries.
//!
//! [`ExpansionContext`] bundles one implementation of each so that `expand`
//! takes a single argument. Nothing here is global: tests and callers build
//! as many independent contexts as they need.

use crate::models::{
    ActionRequest, Bookmark, FloatType, Format, FuncStatus, InsetLayout, OpenDocument, TocList,
    ToolbarInfo,
};
use std::fmt;
use std::path::PathBuf;

/// Resolves textual commands and reports their status.
pub trait ActionRegistry {
    /// Turns a command string from a menu definition into a request.
    /// Resolution never fails; unknown commands surface later as an unknown
    /// status.
    fn resolve(&self, command: &str) -> ActionRequest {
        ActionRequest::from_command(command)
    }

    /// A readable name for diagnostics.
    fn name_of(&self, request: &ActionRequest) -> String {
        request.to_string()
    }

    /// The current status of a request.
    fn status_of(&self, request: &ActionRequest) -> FuncStatus;
}

/// Maps requests to the key sequences bound to them.
pub trait ShortcutRegistry {
    /// Display forms of the bound sequences, in binding order.
    fn bindings_of(&self, request: &ActionRequest) -> Vec<String>;
}

/// Session history: recent files and bookmarks.
pub trait SessionSource {
    /// Recently opened files, most recent first.
    fn last_files(&self) -> Vec<PathBuf>;

    /// Valid bookmark slots in slot order.
    fn bookmarks(&self) -> Vec<Bookmark>;
}

/// The ring of open documents.
pub trait BufferList {
    /// Open documents, starting at the first one of the ring.
    fn open_documents(&self) -> Vec<OpenDocument>;
}

/// Formats that can be imported regardless of the open document.
pub trait FormatRegistry {
    /// All importable formats.
    fn importable_formats(&self) -> Vec<Format>;
}

/// Registered toolbars.
pub trait ToolbarRegistry {
    /// Toolbars in registration order.
    fn toolbars(&self) -> Vec<ToolbarInfo>;
}

/// Clipboard and selection history.
pub trait ClipboardHistory {
    /// Labels of the recent selections, most recent first.
    fn recent_selections(&self) -> Vec<String>;
}

/// The document the menu is being shown for.
pub trait Document {
    /// Table-of-contents lists: headings plus one list per float type.
    fn toc_lists(&self) -> Vec<TocList>;

    /// Float types of the document class, in class order.
    fn float_types(&self) -> Vec<FloatType>;

    /// Inset layouts of the document class, in class order.
    fn inset_layouts(&self) -> Vec<InsetLayout>;

    /// Branches of the master document.
    fn branches(&self) -> Vec<String>;

    /// Formats the document can be exported to. With `viewable_only`,
    /// restricted to the ones that can also be viewed.
    fn exportable_formats(&self, viewable_only: bool) -> Vec<Format>;

    /// For a child document, the request that jumps to its master document.
    fn master_link(&self) -> Option<ActionRequest>;
}

/// Everything `expand` consults, bundled.
#[derive(Clone, Copy)]
pub struct ExpansionContext<'a> {
    /// Command resolution and status.
    pub actions: &'a dyn ActionRegistry,
    /// Key bindings, used for diagnostics and rendering.
    pub shortcuts: &'a dyn ShortcutRegistry,
    /// Recent files and bookmarks.
    pub session: &'a dyn SessionSource,
    /// Open documents.
    pub buffers: &'a dyn BufferList,
    /// Importable formats.
    pub formats: &'a dyn FormatRegistry,
    /// Toolbars.
    pub toolbars: &'a dyn ToolbarRegistry,
    /// Clipboard history.
    pub clipboard: &'a dyn ClipboardHistory,
    /// The current document, if any.
    pub document: Option<&'a dyn Document>,
}

impl fmt::Debug for ExpansionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionContext")
            .field("has_document", &self.document.is_some())
            .finish_non_exhaustive()
    }
}
