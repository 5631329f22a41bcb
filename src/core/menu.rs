// src/core/menu.rs

use crate::{
    constants::flex_families,
    core::{
        context::ActionRegistry,
        entry::{EntryKind, MenuEntry},
        lexer::{KeywordTable, Lexeme, Lexer, Tag, Token},
    },
    models::{ActionRequest, FuncStatus},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keywords of a menu body.
static MENU_TAGS: KeywordTable = KeywordTable {
    production: "menu",
    entries: &[
        ("bookmarks", Tag::Bookmarks),
        ("branches", Tag::Branches),
        ("charstyles", Tag::CharStyles),
        ("custom", Tag::Custom),
        ("documents", Tag::Documents),
        ("elements", Tag::Elements),
        ("end", Tag::End),
        ("exportformats", Tag::ExportFormats),
        ("floatinsert", Tag::FloatInsert),
        ("floatlistinsert", Tag::FloatListInsert),
        ("importformats", Tag::ImportFormats),
        ("item", Tag::Item),
        ("lastfiles", Tag::LastFiles),
        ("optitem", Tag::OptItem),
        ("optsubmenu", Tag::OptSubmenu),
        ("pasterecent", Tag::PasteRecent),
        ("separator", Tag::Separator),
        ("submenu", Tag::Submenu),
        ("toc", Tag::Toc),
        ("toolbars", Tag::Toolbars),
        ("updateformats", Tag::UpdateFormats),
        ("viewformats", Tag::ViewFormats),
    ],
};

/// A problem with the accelerator hints of a menu. Only ever logged and
/// reported; never blocks display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutIssue {
    /// The hint does not occur in the label it belongs to.
    #[error("menu '{menu}': shortcut '{shortcut}' does not occur in '{label}'")]
    Missing {
        /// Name of the menu.
        menu: String,
        /// The entry label, without the hint.
        label: String,
        /// The hint.
        shortcut: String,
    },
    /// Two entries of the same menu share a hint.
    #[error("menu '{menu}': '{first}' and '{second}' share the shortcut '{shortcut}'")]
    Duplicate {
        /// Name of the menu.
        menu: String,
        /// Label of the earlier entry.
        first: String,
        /// Label of the later entry.
        second: String,
        /// The shared hint, as written on the earlier entry.
        shortcut: String,
    },
}

/// An ordered, named sequence of entries. Order is display order.
///
/// Menus held by a [`MenuRegistry`](crate::core::registry::MenuRegistry) are
/// templates: they are filled once by [`Menu::read`] and never changed
/// afterwards. Expansion always builds a new `Menu`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Menu {
    name: String,
    entries: Vec<MenuEntry>,
}

impl Menu {
    /// An empty menu. The menubar has an empty name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// The registry key of this menu.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entries, in display order.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, MenuEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the menu has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last entry, if any.
    pub fn last(&self) -> Option<&MenuEntry> {
        self.entries.last()
    }

    /// Appends an entry unconditionally.
    pub fn add(&mut self, entry: MenuEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Appends an entry if its status allows it.
    ///
    /// Commands are dropped when the registry does not know them, or when they
    /// are optional and disabled; kept commands carry the queried status.
    /// A submenu with an expanded child is enabled when any child command or
    /// submenu is, and dropped when it is optional and not enabled. Separators
    /// are only added after a non-separator entry.
    pub fn add_with_status_check(
        &mut self,
        mut entry: MenuEntry,
        actions: &dyn ActionRegistry,
    ) -> &mut Self {
        match &entry.kind {
            EntryKind::Command(func) => {
                let status = actions.status_of(func);
                if status.is_unknown() {
                    log::debug!(
                        "Dropping '{}' from menu '{}': unknown command '{}'.",
                        entry.label(),
                        self.name,
                        actions.name_of(func)
                    );
                    return self;
                }
                if !status.is_enabled() && entry.optional {
                    return self;
                }
                entry.status = status;
                self.entries.push(entry);
            }
            EntryKind::Submenu {
                child: Some(child), ..
            } => {
                let enabled = child
                    .iter()
                    .any(|e| (e.is_command() || e.is_submenu()) && e.status.is_enabled());
                if !enabled && entry.optional {
                    return self;
                }
                entry.status.set_enabled(enabled);
                self.entries.push(entry);
            }
            EntryKind::Separator => {
                if self.last().is_some_and(|last| !last.is_separator()) {
                    self.entries.push(entry);
                }
            }
            _ => {
                self.entries.push(entry);
            }
        }
        self
    }

    /// True if a command entry of this menu carries a request equal to `func`.
    pub fn has_func(&self, func: &ActionRequest) -> bool {
        self.iter().any(|e| e.func() == Some(func))
    }

    /// Removes a separator at the end of the menu.
    pub fn pop_trailing_separator(&mut self) {
        if self.last().is_some_and(MenuEntry::is_separator) {
            self.entries.pop();
        }
    }

    /// Appends every entry of `other`.
    pub(crate) fn append(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Checks the accelerator hints: each must occur in its own label, and no
    /// two entries may share one (compared ignoring ASCII case).
    ///
    /// Issues are logged as warnings and returned.
    pub fn check_shortcuts(&self) -> Vec<ShortcutIssue> {
        let mut issues = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let shortcut = entry.shortcut();
            if shortcut.is_empty() {
                continue;
            }
            if !entry.label().contains(shortcut) {
                issues.push(ShortcutIssue::Missing {
                    menu: self.name.clone(),
                    label: entry.label().to_string(),
                    shortcut: shortcut.to_string(),
                });
            }
            for other in self.entries.iter().skip(i + 1) {
                if other.shortcut().eq_ignore_ascii_case(shortcut) {
                    issues.push(ShortcutIssue::Duplicate {
                        menu: self.name.clone(),
                        first: entry.label().to_string(),
                        second: other.label().to_string(),
                        shortcut: shortcut.to_string(),
                    });
                }
            }
        }
        for issue in &issues {
            log::warn!("{}", issue);
        }
        issues
    }

    /// Reads a menu body up to and including its `end`, appending the entries.
    ///
    /// Command strings are resolved through `actions` but their status is not
    /// queried; unknown commands only disappear at expansion time. Malformed
    /// lines are reported on the lexer and skipped.
    pub fn read(&mut self, lexer: &mut Lexer, actions: &dyn ActionRegistry) {
        lexer.with_table(&MENU_TAGS, |lex| {
            loop {
                let (tag, token) = match lex.lex() {
                    Lexeme::Tag(tag, token) => (tag, token),
                    Lexeme::Unknown(token) => {
                        lex.report_unknown(&token);
                        continue;
                    }
                    Lexeme::Eof => {
                        lex.report_eof();
                        return;
                    }
                };

                let entry = match tag {
                    Tag::End => return,
                    Tag::Item | Tag::OptItem => read_item(lex, &token, actions)
                        .map(|entry| entry.optional(tag == Tag::OptItem)),
                    Tag::Submenu | Tag::OptSubmenu => read_submenu(lex, &token)
                        .map(|entry| entry.optional(tag == Tag::OptSubmenu)),
                    Tag::Separator => Some(MenuEntry::separator()),
                    other => meta_kind(other).map(|kind| MenuEntry::with_kind(kind, "")),
                };

                if let Some(entry) = entry {
                    self.add(entry);
                }
            }
        });
        log::debug!(
            "Read menu '{}' ({} entries).",
            self.name,
            self.entries.len()
        );
    }
}

impl<'a> IntoIterator for &'a Menu {
    type Item = &'a MenuEntry;
    type IntoIter = std::slice::Iter<'a, MenuEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn read_item(lex: &mut Lexer, tag: &Token, actions: &dyn ActionRegistry) -> Option<MenuEntry> {
    let label = lex.next_arg("label", tag)?;
    let command = lex.next_arg("command", &label)?;
    Some(MenuEntry::command(label.text, actions.resolve(&command.text)))
}

fn read_submenu(lex: &mut Lexer, tag: &Token) -> Option<MenuEntry> {
    let label = lex.next_arg("label", tag)?;
    let name = lex.next_arg("menu name", &label)?;
    Some(MenuEntry::submenu(label.text, name.text))
}

/// The entry kind a bare meta keyword stands for.
fn meta_kind(tag: Tag) -> Option<EntryKind> {
    let kind = match tag {
        Tag::LastFiles => EntryKind::LastFiles,
        Tag::Documents => EntryKind::OpenDocuments,
        Tag::Bookmarks => EntryKind::Bookmarks,
        Tag::Toc => EntryKind::TableOfContents,
        Tag::ViewFormats => EntryKind::ViewFormats,
        Tag::UpdateFormats => EntryKind::UpdateFormats,
        Tag::ExportFormats => EntryKind::ExportFormats,
        Tag::ImportFormats => EntryKind::ImportFormats,
        Tag::CharStyles => flex(flex_families::CHARSTYLE),
        Tag::Custom => flex(flex_families::CUSTOM),
        Tag::Elements => flex(flex_families::ELEMENT),
        Tag::FloatListInsert => EntryKind::FloatListInsert,
        Tag::FloatInsert => EntryKind::FloatInsert,
        Tag::PasteRecent => EntryKind::PasteRecent,
        Tag::Toolbars => EntryKind::Toolbars,
        Tag::Branches => EntryKind::Branches,
        _ => return None,
    };
    Some(kind)
}

fn flex(family: &str) -> EntryKind {
    EntryKind::FlexInsert {
        family: family.to_string(),
    }
}

/// An already-expanded command that can run.
pub(crate) fn enabled_command(label: impl Into<String>, func: ActionRequest) -> MenuEntry {
    MenuEntry::command(label, func).with_status(FuncStatus::enabled())
}

/// A disabled entry that does nothing, shown when a list has no content.
pub(crate) fn placeholder(label: impl Into<String>) -> MenuEntry {
    MenuEntry::command(label, ActionRequest::noaction()).with_status(FuncStatus::disabled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lexer::ParseError;

    /// Knows every command except `bogus`; `disabled-*` commands are disabled.
    struct Actions;

    impl ActionRegistry for Actions {
        fn status_of(&self, request: &ActionRequest) -> FuncStatus {
            if request.action == "bogus" {
                FuncStatus::default()
            } else if request.action.starts_with("disabled") {
                FuncStatus::disabled()
            } else {
                FuncStatus::enabled()
            }
        }
    }

    fn read(text: &str) -> (Menu, Vec<ParseError>) {
        let mut lexer = Lexer::new("test.ui", text);
        let mut menu = Menu::new("test");
        menu.read(&mut lexer, &Actions);
        (menu, lexer.into_diagnostics())
    }

    fn cmd(label: &str, action: &str) -> MenuEntry {
        MenuEntry::command(label, ActionRequest::new(action, ""))
    }

    #[test]
    fn test_read_builds_entries_in_order() {
        let (menu, diagnostics) = read(
            r#"
            Item "Open...|O" "buffer-open"
            item "Print" "dialog-show print"
            separator
            submenu "Export|E" "file_export"
            lastfiles
            charstyles
            toc
            end
            "#,
        );
        assert!(diagnostics.is_empty());
        assert_eq!(menu.len(), 7);

        let entries = menu.entries();
        assert_eq!(entries[0].full_label(), "Open...|O");
        assert_eq!(entries[1].func(), Some(&ActionRequest::new("dialog-show", "print")));
        assert!(entries[2].is_separator());
        assert_eq!(entries[3].submenu_name(), Some("file_export"));
        assert_eq!(entries[4].kind, EntryKind::LastFiles);
        assert_eq!(
            entries[5].kind,
            EntryKind::FlexInsert {
                family: "charstyle".into()
            }
        );
        assert_eq!(entries[6].kind, EntryKind::TableOfContents);
        // Templates never carry a queried status.
        assert!(entries.iter().all(|e| e.status.is_unknown()));
    }

    #[test]
    fn test_optional_flag_applies_to_one_entry_only() {
        let (menu, _) = read(
            r#"optitem "A" "a" item "B" "b" optsubmenu "C" "c" submenu "D" "d" end"#,
        );
        let flags: Vec<bool> = menu.iter().map(|e| e.optional).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn test_unresolvable_command_still_parses() {
        let (menu, diagnostics) = read(r#"item "Nothing" "bogus" end"#);
        assert!(diagnostics.is_empty());
        assert_eq!(menu.len(), 1);
        assert!(menu.entries()[0].is_command());
    }

    #[test]
    fn test_read_recovers_from_malformed_lines() {
        let (menu, diagnostics) = read(
            r#"
            frobnicate
            item "Dangling"
            item "Open" "buffer-open"
            end
            "#,
        );
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.entries()[0].label(), "Open");
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            &diagnostics[0],
            ParseError::UnknownTag { token, production: "menu", .. } if token == "frobnicate"
        ));
        assert!(matches!(
            &diagnostics[1],
            ParseError::MissingArgument { expected: "command", .. }
        ));
    }

    #[test]
    fn test_missing_end_is_reported() {
        let (menu, diagnostics) = read(r#"item "Open" "buffer-open""#);
        assert_eq!(menu.len(), 1);
        assert!(matches!(
            diagnostics.as_slice(),
            [ParseError::UnexpectedEof { production: "menu", .. }]
        ));
    }

    #[test]
    fn test_status_check_on_commands() {
        let mut menu = Menu::new("m");
        menu.add_with_status_check(cmd("Unknown", "bogus"), &Actions)
            .add_with_status_check(cmd("Off", "disabled-thing").optional(true), &Actions)
            .add_with_status_check(cmd("Greyed", "disabled-thing"), &Actions)
            .add_with_status_check(cmd("On", "thing").optional(true), &Actions);

        let labels: Vec<&str> = menu.iter().map(MenuEntry::label).collect();
        assert_eq!(labels, vec!["Greyed", "On"]);
        assert!(!menu.entries()[0].status.is_enabled());
        assert!(menu.entries()[1].status.is_enabled());
    }

    #[test]
    fn test_status_check_on_submenus() {
        let mut dead = Menu::new("dead");
        dead.add(cmd("Off", "x").with_status(FuncStatus::disabled()));
        let mut live = Menu::new("live");
        live.add(cmd("On", "y").with_status(FuncStatus::enabled()));

        let mut optional_dead = MenuEntry::submenu("Dead", "dead").optional(true);
        optional_dead.set_child(dead.clone());
        let mut plain_dead = MenuEntry::submenu("Dead", "dead");
        plain_dead.set_child(dead);
        let mut optional_live = MenuEntry::submenu("Live", "live").optional(true);
        optional_live.set_child(live);

        let mut menu = Menu::new("m");
        menu.add_with_status_check(optional_dead, &Actions)
            .add_with_status_check(plain_dead, &Actions)
            .add_with_status_check(optional_live, &Actions)
            .add_with_status_check(MenuEntry::submenu("Unexpanded", "u"), &Actions);

        let labels: Vec<&str> = menu.iter().map(MenuEntry::label).collect();
        assert_eq!(labels, vec!["Dead", "Live", "Unexpanded"]);
        assert!(!menu.entries()[0].status.is_enabled());
        assert!(menu.entries()[1].status.is_enabled());
    }

    #[test]
    fn test_separators_never_lead_or_repeat() {
        let mut menu = Menu::new("m");
        menu.add_with_status_check(MenuEntry::separator(), &Actions)
            .add_with_status_check(cmd("A", "a"), &Actions)
            .add_with_status_check(MenuEntry::separator(), &Actions)
            .add_with_status_check(MenuEntry::separator(), &Actions);
        assert_eq!(menu.len(), 2);

        menu.pop_trailing_separator();
        assert_eq!(menu.len(), 1);
        menu.pop_trailing_separator();
        assert_eq!(menu.len(), 1);
    }

    #[test]
    fn test_check_shortcuts() {
        let mut menu = Menu::new("file");
        menu.add(cmd("Open|O", "a"))
            .add(cmd("Close|o", "b"))
            .add(cmd("Save|x", "c"))
            .add(cmd("Quit", "d"));

        let issues = menu.check_shortcuts();
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            ShortcutIssue::Duplicate { first, second, .. } if first == "Open" && second == "Close"
        ));
        assert!(matches!(
            &issues[1],
            ShortcutIssue::Missing { label, shortcut, .. } if label == "Save" && shortcut == "x"
        ));
    }

    #[test]
    fn test_has_func_compares_requests() {
        let mut menu = Menu::new("special");
        menu.add(MenuEntry::command("About", ActionRequest::new("dialog-show", "aboutlyx")));
        assert!(menu.has_func(&ActionRequest::from_command("dialog-show aboutlyx")));
        assert!(!menu.has_func(&ActionRequest::from_command("dialog-show prefs")));
    }
}
