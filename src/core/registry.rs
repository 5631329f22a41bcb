//! # Menu Registry
//!
//! The catalogue of menu templates: every named menu, the menubar and the
//! exclusion menu. Menus refer to each other by name only; names are resolved
//! when a menu is expanded, so a submenu may be declared before or after the
//! menu that uses it, or not at all.
//!
//! The registry is filled once by [`MenuRegistry::read`] and then shared
//! read-only. It hands out shared references only, so a template can never be
//! changed while an expansion is reading it.

use crate::core::{
    context::{ActionRegistry, ExpansionContext},
    entry::MenuEntry,
    expander::Expander,
    lexer::{KeywordTable, Lexeme, Lexer, ParseError, Tag},
    menu::{Menu, ShortcutIssue},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keywords of a `menuset` block.
static MENUSET_TAGS: KeywordTable = KeywordTable {
    production: "menuset",
    entries: &[
        ("end", Tag::End),
        ("menu", Tag::Menu),
        ("menubar", Tag::Menubar),
    ],
};

/// Keywords accepted before a `menuset` block in a bare definition text.
static DEFINITION_TAGS: KeywordTable = KeywordTable {
    production: "definition",
    entries: &[("menuset", Tag::Menuset)],
};

/// A problem found by [`MenuRegistry::check`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateIssue {
    /// A submenu entry names a menu that is not registered.
    #[error(
        "menu '{}': submenu '{label}' refers to unknown menu '{target}'",
        display_name(.menu)
    )]
    UnresolvedSubmenu {
        /// The menu holding the entry (empty for the menubar).
        menu: String,
        /// The entry label.
        label: String,
        /// The name that does not resolve.
        target: String,
    },
    /// An accelerator hint problem.
    #[error(transparent)]
    Shortcut(#[from] ShortcutIssue),
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "<menubar>" } else { name }
}

/// All menu templates of an application.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MenuRegistry {
    menus: Vec<Menu>,
    menubar: Menu,
    special: Menu,
}

impl MenuRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a whole definition text (`menuset ... end`, possibly repeated).
    ///
    /// Returns the registry together with every diagnostic produced while
    /// reading. Diagnostics never prevent a registry from being built.
    pub fn parse(
        file: &str,
        text: &str,
        actions: &dyn ActionRegistry,
    ) -> (Self, Vec<ParseError>) {
        let mut registry = Self::new();
        let mut lexer = Lexer::new(file, text);
        lexer.with_table(&DEFINITION_TAGS, |lex| {
            loop {
                match lex.lex() {
                    Lexeme::Tag(Tag::Menuset, _) => registry.read(lex, actions),
                    Lexeme::Tag(_, token) | Lexeme::Unknown(token) => lex.report_unknown(&token),
                    Lexeme::Eof => break,
                }
            }
        });
        (registry, lexer.into_diagnostics())
    }

    /// Reads the body of a `menuset` block, up to and including its `end`.
    ///
    /// A `menu` block naming a registered menu, and any repeated `menubar`
    /// block, append to the existing menu.
    pub fn read(&mut self, lexer: &mut Lexer, actions: &dyn ActionRegistry) {
        lexer.with_table(&MENUSET_TAGS, |lex| {
            loop {
                match lex.lex() {
                    Lexeme::Tag(Tag::End, _) => return,
                    Lexeme::Tag(Tag::Menubar, _) => self.menubar.read(lex, actions),
                    Lexeme::Tag(Tag::Menu, token) => {
                        let Some(name) = lex.next_arg("menu name", &token) else {
                            continue;
                        };
                        if let Some(menu) = self.menu_for_reading(&name.text) {
                            menu.read(lex, actions);
                        }
                    }
                    Lexeme::Tag(_, token) | Lexeme::Unknown(token) => lex.report_unknown(&token),
                    Lexeme::Eof => {
                        lex.report_eof();
                        return;
                    }
                }
            }
        });
    }

    /// Registers a menu. A menu with the same name is replaced.
    pub fn add(&mut self, menu: Menu) {
        match self.menus.iter_mut().find(|m| m.name() == menu.name()) {
            Some(existing) => {
                log::debug!("Replacing menu '{}'.", menu.name());
                *existing = menu;
            }
            None => self.menus.push(menu),
        }
    }

    /// Adds every menu of `other`, appending to menus that already exist.
    /// The other registry's exclusion menu is ignored.
    pub fn merge(&mut self, other: Self) {
        self.menubar.append(other.menubar);
        for menu in other.menus {
            match self.menus.iter_mut().find(|m| m.name() == menu.name()) {
                Some(existing) => existing.append(menu),
                None => self.menus.push(menu),
            }
        }
    }

    /// True if a menu called `name` is registered.
    pub fn has_menu(&self, name: &str) -> bool {
        self.menus.iter().any(|m| m.name() == name)
    }

    /// The menu called `name`.
    pub fn get_menu(&self, name: &str) -> Option<&Menu> {
        self.menus.iter().find(|m| m.name() == name)
    }

    /// Sets the exclusion menu, replacing the previous one. Commands it
    /// contains are left out of every expanded menu.
    pub fn special_menu(&mut self, menu: Menu) {
        self.special = menu;
    }

    /// The exclusion menu.
    pub fn special(&self) -> &Menu {
        &self.special
    }

    /// The menubar.
    pub fn menubar(&self) -> &Menu {
        &self.menubar
    }

    /// All named menus, in registration order.
    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    /// Expands `source` against `context`. See [`Expander`].
    pub fn expand(&self, source: &Menu, context: &ExpansionContext<'_>) -> Menu {
        Expander::new(self, context).expand(source)
    }

    /// Lists unresolved submenu references and shortcut problems of every
    /// template, menubar first.
    pub fn check(&self) -> Vec<TemplateIssue> {
        let mut issues = Vec::new();
        for menu in std::iter::once(&self.menubar).chain(&self.menus) {
            for entry in menu {
                if let Some(target) = entry.submenu_name()
                    && !self.has_menu(target)
                {
                    issues.push(TemplateIssue::UnresolvedSubmenu {
                        menu: menu.name().to_string(),
                        label: entry.label().to_string(),
                        target: target.to_string(),
                    });
                }
            }
            issues.extend(menu.check_shortcuts().into_iter().map(TemplateIssue::Shortcut));
        }
        issues
    }

    /// Total number of template entries, menubar included.
    pub fn entry_count(&self) -> usize {
        std::iter::once(&self.menubar)
            .chain(&self.menus)
            .map(Menu::len)
            .sum()
    }

    fn menu_for_reading(&mut self, name: &str) -> Option<&mut Menu> {
        match self.menus.iter().position(|m| m.name() == name) {
            Some(index) => self.menus.get_mut(index),
            None => {
                self.menus.push(Menu::new(name));
                self.menus.last_mut()
            }
        }
    }
}

/// Builds the exclusion menu from commands, e.g. those a platform moves into
/// its own application menu.
pub fn exclusion_menu<'a>(
    commands: impl IntoIterator<Item = &'a str>,
    actions: &dyn ActionRegistry,
) -> Menu {
    let mut menu = Menu::new("");
    for command in commands {
        menu.add(MenuEntry::command(command, actions.resolve(command)));
    }
    menu
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionRequest, FuncStatus};

    struct Actions;

    impl ActionRegistry for Actions {
        fn status_of(&self, _request: &ActionRequest) -> FuncStatus {
            FuncStatus::enabled()
        }
    }

    const DEFINITION: &str = r#"
        menuset
          menubar
            submenu "File|F" "file"
            submenu "Edit|E" "edit"
          end
          menu "file"
            item "Open|O" "buffer-open"
          end
          menu "edit"
            item "Undo|U" "undo"
          end
          menu "file"
            item "Close|C" "buffer-close"
          end
        end
    "#;

    #[test]
    fn test_parse_registers_menus_and_menubar() {
        let (registry, diagnostics) = MenuRegistry::parse("test.ui", DEFINITION, &Actions);
        assert!(diagnostics.is_empty());
        assert_eq!(registry.menubar().len(), 2);
        assert_eq!(registry.menubar().name(), "");
        assert!(registry.has_menu("file"));
        assert!(registry.has_menu("edit"));
        assert!(!registry.has_menu("view"));
        assert_eq!(registry.menus().len(), 2);
        assert_eq!(registry.entry_count(), 5);
    }

    #[test]
    fn test_repeated_menu_block_appends() {
        let (registry, _) = MenuRegistry::parse("test.ui", DEFINITION, &Actions);
        let file = registry.get_menu("file").map(|m| {
            m.iter().map(|e| e.label().to_string()).collect::<Vec<_>>()
        });
        assert_eq!(file, Some(vec!["Open".to_string(), "Close".to_string()]));
    }

    #[test]
    fn test_repeated_menubar_block_appends() {
        let text = r#"menuset menubar submenu "A" "a" end menubar submenu "B" "b" end end"#;
        let (registry, diagnostics) = MenuRegistry::parse("test.ui", text, &Actions);
        assert!(diagnostics.is_empty());
        assert_eq!(registry.menubar().len(), 2);
    }

    #[test]
    fn test_unknown_top_level_tag_is_reported() {
        let text = r#"menuset bogus menu "a" end end trailing"#;
        let (registry, diagnostics) = MenuRegistry::parse("test.ui", text, &Actions);
        assert!(registry.has_menu("a"));
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            &diagnostics[0],
            ParseError::UnknownTag { production: "menuset", .. }
        ));
        assert!(matches!(
            &diagnostics[1],
            ParseError::UnknownTag { production: "definition", .. }
        ));
    }

    #[test]
    fn test_add_replaces_and_merge_appends() {
        let mut registry = MenuRegistry::new();
        let mut first = Menu::new("file");
        first.add(MenuEntry::command("A", ActionRequest::new("a", "")));
        registry.add(first);
        registry.add(Menu::new("file"));
        assert_eq!(registry.menus().len(), 1);
        assert!(registry.get_menu("file").is_some_and(Menu::is_empty));

        let (other, _) = MenuRegistry::parse("other.ui", DEFINITION, &Actions);
        registry.merge(other);
        assert_eq!(registry.menus().len(), 2);
        assert_eq!(registry.get_menu("file").map(Menu::len), Some(2));
        assert_eq!(registry.menubar().len(), 2);
    }

    #[test]
    fn test_special_menu_is_replaced() {
        let mut registry = MenuRegistry::new();
        registry.special_menu(exclusion_menu(["dialog-show aboutlyx"], &Actions));
        registry.special_menu(exclusion_menu(["dialog-show prefs", "lyx-quit"], &Actions));
        assert_eq!(registry.special().len(), 2);
        assert!(registry.special().has_func(&ActionRequest::new("lyx-quit", "")));
        assert!(!registry.special().has_func(&ActionRequest::new("dialog-show", "aboutlyx")));
    }

    #[test]
    fn test_check_reports_unresolved_submenus_and_shortcuts() {
        let text = r#"
            menuset
              menubar submenu "File|F" "file" submenu "Help|H" "help" end
              menu "file"
                item "Open|O" "buffer-open"
                item "Options|O" "dialog-show prefs"
              end
            end
        "#;
        let (registry, _) = MenuRegistry::parse("test.ui", text, &Actions);
        let issues = registry.check();
        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0].to_string(),
            "menu '<menubar>': submenu 'Help' refers to unknown menu 'help'"
        );
        assert!(matches!(
            &issues[1],
            TemplateIssue::Shortcut(ShortcutIssue::Duplicate { .. })
        ));
        assert_eq!(
            issues[1].to_string(),
            "menu 'file': 'Open' and 'Options' share the shortcut 'O'"
        );
    }

    #[test]
    fn test_shortcut_issue_converts_and_keeps_its_message() {
        let issue = ShortcutIssue::Missing {
            menu: "edit".to_string(),
            label: "Paste".to_string(),
            shortcut: "x".to_string(),
        };
        let text = issue.to_string();
        let wrapped: TemplateIssue = issue.into();
        assert_eq!(wrapped.to_string(), text);
        assert!(std::error::Error::source(&wrapped).is_none());
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MenuRegistry>();
    }
}
