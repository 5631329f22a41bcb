//! # Expander
//!
//! Builds the concrete menu shown to the user from a template.
//!
//! Expansion walks the template once, copying plain entries through
//! [`Menu::add_with_status_check`], recursing into submenus by name, and
//! replacing every meta entry with the commands its generator builds from the
//! [`ExpansionContext`]. The template is only ever read; the result is a new
//! `Menu` owned by the caller.
//!
//! Submenu references are resolved here, against the registry. A reference
//! that does not resolve, that points back into the chain currently being
//! expanded, or that nests deeper than [`MAX_SUBMENU_DEPTH`] becomes an empty
//! submenu.

use crate::{
    constants::{
        DOCUMENT_PATH_LIMIT, LAST_FILES_PATH_LIMIT, MAX_NUMBERED_ENTRIES, MAX_SUBMENU_DEPTH,
        actions,
    },
    core::{
        context::ExpansionContext,
        entry::{EntryKind, MenuEntry},
        menu::{Menu, enabled_command, placeholder},
        paths::make_display_path,
        registry::MenuRegistry,
        toc,
    },
    models::{ActionRequest, Format, FuncStatus},
};
use std::collections::HashSet;
use std::path::Path;

/// Expands templates of one registry against one context.
#[derive(Debug)]
pub struct Expander<'a> {
    registry: &'a MenuRegistry,
    context: ExpansionContext<'a>,
    // Names of the submenus being expanded, outermost first.
    chain: Vec<String>,
}

impl<'a> Expander<'a> {
    /// Creates an expander.
    pub fn new(registry: &'a MenuRegistry, context: &ExpansionContext<'a>) -> Self {
        Self {
            registry,
            context: *context,
            chain: Vec::new(),
        }
    }

    /// Expands `source` into a new menu.
    ///
    /// The result never holds two adjacent separators, never ends with one,
    /// and only holds commands with a known status.
    pub fn expand(&mut self, source: &Menu) -> Menu {
        let named = !source.name().is_empty();
        if named {
            self.chain.push(source.name().to_string());
        }
        let dest = self.expand_entries(source);
        if named {
            self.chain.pop();
        }
        dest
    }

    fn expand_entries(&mut self, source: &Menu) -> Menu {
        let actions = self.context.actions;
        let mut dest = Menu::new(source.name());

        for entry in source {
            match &entry.kind {
                EntryKind::Command(func) => {
                    if self.registry.special().has_func(func) {
                        log::trace!("'{}' is claimed by the exclusion menu.", func);
                        continue;
                    }
                    dest.add_with_status_check(entry.clone(), actions);
                }
                EntryKind::Separator => {
                    dest.add_with_status_check(entry.clone(), actions);
                }
                EntryKind::Submenu { name, .. } => {
                    let child = self.expand_submenu(name);
                    let mut copy = entry.clone();
                    copy.set_child(child);
                    dest.add_with_status_check(copy, actions);
                }
                EntryKind::LastFiles => self.expand_last_files(&mut dest),
                EntryKind::OpenDocuments => self.expand_documents(&mut dest),
                EntryKind::Bookmarks => self.expand_bookmarks(&mut dest),
                EntryKind::TableOfContents => match self.context.document {
                    Some(document) => toc::expand_toc(&mut dest, document),
                    None => {
                        dest.add(placeholder(t!("menu.placeholder.no_document")));
                    }
                },
                EntryKind::ViewFormats
                | EntryKind::UpdateFormats
                | EntryKind::ExportFormats
                | EntryKind::ImportFormats => self.expand_formats(&entry.kind, &mut dest),
                EntryKind::FlexInsert { family } => self.expand_flex_insets(family, &mut dest),
                EntryKind::FloatListInsert => self.expand_floats(&mut dest, true),
                EntryKind::FloatInsert => self.expand_floats(&mut dest, false),
                EntryKind::PasteRecent => self.expand_paste_recent(&mut dest),
                EntryKind::Toolbars => self.expand_toolbars(&mut dest),
                EntryKind::Branches => self.expand_branches(&mut dest),
            }
        }

        dest.pop_trailing_separator();
        dest.check_shortcuts();
        dest
    }

    fn expand_submenu(&mut self, name: &str) -> Menu {
        if self.chain.iter().any(|n| n == name) || self.chain.len() >= MAX_SUBMENU_DEPTH {
            log::warn!(
                "Submenu '{}' not expanded: cyclic or too deep ({} -> {}).",
                name,
                self.chain.join(" -> "),
                name
            );
            return Menu::new(name);
        }

        let Some(template) = self.registry.get_menu(name) else {
            if cfg!(debug_assertions) {
                log::error!("Submenu '{}' is not defined.", name);
            } else {
                log::warn!("Submenu '{}' is not defined.", name);
            }
            return Menu::new(name);
        };

        self.expand(template)
    }

    fn expand_last_files(&self, dest: &mut Menu) {
        let files = self.context.session.last_files();
        let shown: Vec<&Path> = files
            .iter()
            .take(MAX_NUMBERED_ENTRIES)
            .map(|p| p.as_path())
            .collect();
        let labels = short_names(&shown, LAST_FILES_PATH_LIMIT);

        for (i, (path, label)) in shown.iter().zip(labels).enumerate() {
            let n = i + 1;
            dest.add(enabled_command(
                format!("{}. {}|{}", n, label, n),
                ActionRequest::new(actions::FILE_OPEN, path.display().to_string()),
            ));
        }
    }

    fn expand_documents(&self, dest: &mut Menu) {
        let documents = self.context.buffers.open_documents();
        if documents.is_empty() {
            dest.add(placeholder(t!("menu.placeholder.no_documents")));
            return;
        }

        let paths: Vec<&Path> = documents.iter().map(|d| d.path.as_path()).collect();
        let labels = short_names(&paths, DOCUMENT_PATH_LIMIT);

        for (i, (document, mut label)) in documents.iter().zip(labels).enumerate() {
            if !document.clean {
                label.push('*');
            }
            if i < MAX_NUMBERED_ENTRIES {
                let n = i + 1;
                label = format!("{}. {}|{}", n, label, n);
            }
            dest.add(enabled_command(
                label,
                ActionRequest::new(actions::BUFFER_SWITCH, document.path.display().to_string()),
            ));
        }
    }

    fn expand_bookmarks(&self, dest: &mut Menu) {
        for bookmark in self.context.session.bookmarks() {
            let slot = bookmark.slot;
            dest.add(enabled_command(
                format!(
                    "{}. {}|{}",
                    slot,
                    make_display_path(&bookmark.path, DOCUMENT_PATH_LIMIT),
                    slot
                ),
                ActionRequest::new(actions::BOOKMARK_GOTO, slot.to_string()),
            ));
        }
    }

    fn expand_formats(&self, kind: &EntryKind, dest: &mut Menu) {
        let document = self.context.document;
        let (action, mut formats) = match (kind, document) {
            (EntryKind::ImportFormats, _) => {
                (actions::BUFFER_IMPORT, self.context.formats.importable_formats())
            }
            (_, None) => {
                dest.add(placeholder(t!("menu.placeholder.no_document")));
                return;
            }
            (EntryKind::ViewFormats, Some(doc)) => {
                (actions::BUFFER_VIEW, doc.exportable_formats(true))
            }
            (EntryKind::UpdateFormats, Some(doc)) => {
                (actions::BUFFER_UPDATE, doc.exportable_formats(true))
            }
            (_, Some(doc)) => (actions::BUFFER_EXPORT, doc.exportable_formats(false)),
        };
        let importing = action == actions::BUFFER_IMPORT;

        formats.retain(|f| !f.dummy && (importing || f.document_format));
        formats.sort_by_cached_key(|f| f.pretty_name.to_ascii_lowercase());

        for format in &formats {
            let entry = MenuEntry::command(
                format_label(format, importing),
                ActionRequest::new(action, format.name.clone()),
            );
            if document.is_some() {
                dest.add_with_status_check(entry, self.context.actions);
            } else {
                dest.add(entry.with_status(FuncStatus::enabled()));
            }
        }
    }

    fn expand_flex_insets(&self, family: &str, dest: &mut Menu) {
        let Some(document) = self.context.document else {
            dest.add(placeholder(t!("menu.placeholder.no_document")));
            return;
        };
        for layout in document.inset_layouts() {
            if layout.family.eq_ignore_ascii_case(family) {
                dest.add(enabled_command(
                    layout.name.clone(),
                    ActionRequest::new(actions::FLEX_INSERT, layout.name),
                ));
            }
        }
    }

    fn expand_floats(&self, dest: &mut Menu, lists: bool) {
        let Some(document) = self.context.document else {
            dest.add(placeholder(t!("menu.placeholder.no_document")));
            return;
        };
        for float in document.float_types() {
            let (label, action) = if lists {
                (float.list_name, actions::FLOAT_LIST)
            } else {
                (float.name, actions::FLOAT_INSERT)
            };
            dest.add_with_status_check(
                MenuEntry::command(label, ActionRequest::new(action, float.kind)),
                self.context.actions,
            );
        }
    }

    fn expand_paste_recent(&self, dest: &mut Menu) {
        if self.context.document.is_none() {
            return;
        }
        for (index, selection) in self.context.clipboard.recent_selections().into_iter().enumerate()
        {
            dest.add(enabled_command(
                selection,
                ActionRequest::new(actions::PASTE, index.to_string()),
            ));
        }
    }

    fn expand_toolbars(&self, dest: &mut Menu) {
        for toolbar in self.context.toolbars.toolbars() {
            let mut label = toolbar.gui_name;
            if toolbar.auto {
                label.push_str(t!("menu.label.toolbar_auto"));
            }
            dest.add(
                MenuEntry::command(
                    label,
                    ActionRequest::new(actions::TOOLBAR_TOGGLE, toolbar.name),
                )
                .with_status(FuncStatus::enabled().with_checked(toolbar.visible)),
            );
        }
    }

    fn expand_branches(&self, dest: &mut Menu) {
        let Some(document) = self.context.document else {
            dest.add(placeholder(t!("menu.placeholder.no_document")));
            return;
        };
        let branches = document.branches();
        if branches.is_empty() {
            dest.add(placeholder(t!("menu.placeholder.no_branches")));
            return;
        }
        for (i, branch) in branches.into_iter().enumerate() {
            let label = if i < MAX_NUMBERED_ENTRIES {
                format!("{}. {}|{}", i + 1, branch, i + 1)
            } else {
                branch.clone()
            };
            dest.add_with_status_check(
                MenuEntry::command(label, ActionRequest::new(actions::BRANCH_INSERT, branch)),
                self.context.actions,
            );
        }
    }
}

/// Expands `source` against `context`. Shorthand for
/// [`MenuRegistry::expand`].
pub fn expand(registry: &MenuRegistry, source: &Menu, context: &ExpansionContext<'_>) -> Menu {
    registry.expand(source, context)
}

/// Bare file names when they tell the paths apart, display paths otherwise.
fn short_names(paths: &[&Path], threshold: usize) -> Vec<String> {
    let names: Vec<Option<String>> = paths
        .iter()
        .map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    let distinct: HashSet<&Option<String>> = names.iter().collect();

    if names.iter().all(Option::is_some) && distinct.len() == names.len() {
        names.into_iter().flatten().collect()
    } else {
        paths
            .iter()
            .map(|p| make_display_path(p, threshold))
            .collect()
    }
}

fn format_label(format: &Format, importing: bool) -> String {
    let mut label = if importing {
        match format.name.as_str() {
            "text" => t!("menu.label.import_text_lines").to_string(),
            "textparagraph" => t!("menu.label.import_text_paragraphs").to_string(),
            _ => format.pretty_name.clone(),
        }
    } else {
        format.pretty_name.clone()
    };
    if importing {
        label.push_str("...");
    }
    if !format.shortcut.is_empty() {
        label.push('|');
        label.push_str(&format.shortcut);
    }
    label
}
