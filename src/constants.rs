// src/constants.rs

/// The name of the application directory under the user's config and cache dirs.
pub const APP_DIR_NAME: &str = "menuset";

/// The name of the settings file (inside the config dir).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Environment variable that overrides the template cache directory.
pub const CACHE_DIR_ENV: &str = "MENUSET_CACHE_DIR";

/// Extension of UI definition files and fragments.
pub const UI_FILE_EXTENSION: &str = "ui";

/// Extension of compiled template cache files.
pub const CACHE_FILE_EXTENSION: &str = "bin";

/// Largest number of entries a flat table-of-contents page may hold.
pub const MAX_TOC_ITEMS_PER_PAGE: usize = 25;

/// Longest table-of-contents label before it is elided with `...`.
pub const TOC_LABEL_LIMIT: usize = 45;

/// Display-path threshold for recently opened files.
pub const LAST_FILES_PATH_LIMIT: usize = 30;

/// Display-path threshold for open documents and bookmarks.
pub const DOCUMENT_PATH_LIMIT: usize = 20;

/// Entries numbered `1..=9` get a digit mnemonic; later ones do not.
pub const MAX_NUMBERED_ENTRIES: usize = 9;

/// Deepest chain of submenus followed during one expansion.
pub const MAX_SUBMENU_DEPTH: usize = 32;

/// TOC list type holding the document headings; every other list is a float list.
pub const TOC_HEADINGS_LIST: &str = "tableofcontents";

/// Action identifiers the expansion engine builds requests for.
pub mod actions {
    /// Does nothing; used by disabled placeholder entries.
    pub const NOACTION: &str = "noaction";
    /// Opens the file named by the argument.
    pub const FILE_OPEN: &str = "file-open";
    /// Switches to the open document named by the argument.
    pub const BUFFER_SWITCH: &str = "buffer-switch";
    /// Jumps to the bookmark slot given as argument.
    pub const BOOKMARK_GOTO: &str = "bookmark-goto";
    /// Views the current document in the given format.
    pub const BUFFER_VIEW: &str = "buffer-view";
    /// Updates the current document's output in the given format.
    pub const BUFFER_UPDATE: &str = "buffer-update";
    /// Exports the current document to the given format.
    pub const BUFFER_EXPORT: &str = "buffer-export";
    /// Imports a file of the given format.
    pub const BUFFER_IMPORT: &str = "buffer-import";
    /// Inserts a flex inset of the given layout.
    pub const FLEX_INSERT: &str = "flex-insert";
    /// Inserts the list of floats of the given type.
    pub const FLOAT_LIST: &str = "float-list";
    /// Inserts a float of the given type.
    pub const FLOAT_INSERT: &str = "float-insert";
    /// Pastes the clipboard history entry at the given index.
    pub const PASTE: &str = "paste";
    /// Toggles the toolbar with the given name.
    pub const TOOLBAR_TOGGLE: &str = "toolbar-toggle";
    /// Inserts the branch with the given name.
    pub const BRANCH_INSERT: &str = "branch-insert";
}

/// Family tags of flex inset layouts, as selected by the menu grammar.
pub mod flex_families {
    /// `charstyles` entries.
    pub const CHARSTYLE: &str = "charstyle";
    /// `custom` entries.
    pub const CUSTOM: &str = "custom";
    /// `elements` entries.
    pub const ELEMENT: &str = "element";
}
