// src/core/entry.rs

use crate::{
    core::{context::ShortcutRegistry, menu::Menu},
    models::{ActionRequest, FuncStatus},
};
use serde::{Deserialize, Serialize};

/// What a menu line stands for.
///
/// The set is closed and mirrors the menu grammar one-to-one; the expansion
/// engine matches on it exhaustively.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EntryKind {
    /// Runs an action.
    Command(ActionRequest),
    /// Opens the registered menu called `name`.
    Submenu {
        /// Registry key of the referenced menu.
        name: String,
        /// The expanded child. Always `None` in templates.
        #[serde(skip)]
        child: Option<Menu>,
    },
    /// A visual divider.
    Separator,
    /// Recently opened files.
    LastFiles,
    /// The open-document ring.
    OpenDocuments,
    /// Valid bookmark slots.
    Bookmarks,
    /// The current document's table of contents.
    TableOfContents,
    /// Formats the document can be viewed in.
    ViewFormats,
    /// Formats whose output can be updated.
    UpdateFormats,
    /// Formats the document can be exported to.
    ExportFormats,
    /// Formats that can be imported.
    ImportFormats,
    /// Flex inset layouts of one family.
    FlexInsert {
        /// Family tag the layouts are filtered by.
        family: String,
    },
    /// Lists of floats, one per float type.
    FloatListInsert,
    /// Floats, one per float type.
    FloatInsert,
    /// The clipboard history.
    PasteRecent,
    /// Toolbar visibility toggles.
    Toolbars,
    /// The document's branches.
    Branches,
}

impl EntryKind {
    /// True for the kinds that expand into generated commands.
    pub fn is_meta(&self) -> bool {
        !matches!(
            self,
            Self::Command(_) | Self::Submenu { .. } | Self::Separator
        )
    }
}

/// One line of a menu.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MenuEntry {
    /// What the line stands for.
    pub kind: EntryKind,
    /// Display text, optionally followed by `|` and an accelerator hint.
    pub label: String,
    /// Dropped from expanded menus when disabled or empty.
    pub optional: bool,
    /// Populated on expanded entries only.
    #[serde(skip)]
    pub status: FuncStatus,
}

impl MenuEntry {
    /// A command entry.
    pub fn command(label: impl Into<String>, func: ActionRequest) -> Self {
        Self::with_kind(EntryKind::Command(func), label)
    }

    /// A reference to the registered menu `name`.
    pub fn submenu(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(
            EntryKind::Submenu {
                name: name.into(),
                child: None,
            },
            label,
        )
    }

    /// A separator.
    pub fn separator() -> Self {
        Self::with_kind(EntryKind::Separator, "")
    }

    /// An entry of any kind.
    pub fn with_kind(kind: EntryKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            optional: false,
            status: FuncStatus::default(),
        }
    }

    /// Marks the entry optional.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Attaches a status.
    pub fn with_status(mut self, status: FuncStatus) -> Self {
        self.status = status;
        self
    }

    /// The label text before the first `|`.
    pub fn label(&self) -> &str {
        self.label.split('|').next().unwrap_or("")
    }

    /// The accelerator hint after the first `|`, or empty.
    pub fn shortcut(&self) -> &str {
        self.label.split('|').nth(1).unwrap_or("")
    }

    /// The full label including the accelerator hint.
    pub fn full_label(&self) -> &str {
        &self.label
    }

    /// The action request of a command entry.
    pub fn func(&self) -> Option<&ActionRequest> {
        match &self.kind {
            EntryKind::Command(func) => Some(func),
            _ => None,
        }
    }

    /// The registry key of a submenu entry.
    pub fn submenu_name(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Submenu { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The expanded child of a submenu entry.
    pub fn child(&self) -> Option<&Menu> {
        match &self.kind {
            EntryKind::Submenu { child, .. } => child.as_ref(),
            _ => None,
        }
    }

    /// Attaches an expanded child. Has no effect on other kinds.
    pub fn set_child(&mut self, menu: Menu) {
        if let EntryKind::Submenu { child, .. } = &mut self.kind {
            *child = Some(menu);
        }
    }

    /// True for command entries.
    pub fn is_command(&self) -> bool {
        matches!(self.kind, EntryKind::Command(_))
    }

    /// True for submenu entries.
    pub fn is_submenu(&self) -> bool {
        matches!(self.kind, EntryKind::Submenu { .. })
    }

    /// True for separators.
    pub fn is_separator(&self) -> bool {
        matches!(self.kind, EntryKind::Separator)
    }

    /// The display form of the first key sequence bound to this entry's
    /// action, or empty when there is none.
    pub fn binding(&self, shortcuts: &dyn ShortcutRegistry) -> String {
        self.func()
            .and_then(|func| shortcuts.bindings_of(func).into_iter().next())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bindings;

    impl ShortcutRegistry for Bindings {
        fn bindings_of(&self, request: &ActionRequest) -> Vec<String> {
            if request.action == "buffer-open" {
                vec!["C-o".to_string(), "M-f o".to_string()]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_label_and_shortcut_split_on_first_bar() {
        let entry = MenuEntry::command("Open...|O", ActionRequest::new("buffer-open", ""));
        assert_eq!(entry.label(), "Open...");
        assert_eq!(entry.shortcut(), "O");
        assert_eq!(entry.full_label(), "Open...|O");

        let plain = MenuEntry::submenu("Edit", "edit");
        assert_eq!(plain.label(), "Edit");
        assert_eq!(plain.shortcut(), "");
        assert_eq!(plain.submenu_name(), Some("edit"));
        assert!(plain.child().is_none());
    }

    #[test]
    fn test_binding_uses_first_sequence() {
        let open = MenuEntry::command("Open", ActionRequest::new("buffer-open", ""));
        let close = MenuEntry::command("Close", ActionRequest::new("buffer-close", ""));
        assert_eq!(open.binding(&Bindings), "C-o");
        assert_eq!(close.binding(&Bindings), "");
        assert_eq!(MenuEntry::separator().binding(&Bindings), "");
    }

    #[test]
    fn test_set_child_only_affects_submenus() {
        let mut sub = MenuEntry::submenu("File", "file");
        sub.set_child(Menu::new("file"));
        assert_eq!(sub.child().map(Menu::name), Some("file"));

        let mut sep = MenuEntry::separator();
        sep.set_child(Menu::new("file"));
        assert!(sep.child().is_none());
    }

    #[test]
    fn test_meta_kinds() {
        assert!(EntryKind::LastFiles.is_meta());
        assert!(
            EntryKind::FlexInsert {
                family: "custom".into()
            }
            .is_meta()
        );
        assert!(!EntryKind::Separator.is_meta());
        assert!(!EntryKind::Command(ActionRequest::noaction()).is_meta());
    }
}
