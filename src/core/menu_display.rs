// src/core/menu_display.rs

use crate::core::{context::ShortcutRegistry, entry::MenuEntry, menu::Menu};
use colored::Colorize;
use serde::Serialize;

/// Controls what the tree shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    /// Append the key binding of each command.
    pub show_bindings: bool,
    /// Append the action request of each command.
    pub show_commands: bool,
    /// Stop descending below this many submenu levels.
    pub max_depth: Option<usize>,
    /// Render without ANSI colors.
    pub plain: bool,
}

/// Renders an expanded menu as an ASCII tree, one entry per line.
pub fn render_menu_tree(
    menu: &Menu,
    shortcuts: &dyn ShortcutRegistry,
    options: &DisplayOptions,
) -> String {
    let mut out = String::new();
    render_entries(menu, shortcuts, options, "", 0, &mut out);
    out
}

/// Prints an expanded menu as an ASCII tree.
pub fn display_menu_tree(menu: &Menu, shortcuts: &dyn ShortcutRegistry, options: &DisplayOptions) {
    print!("{}", render_menu_tree(menu, shortcuts, options));
}

fn render_entries(
    menu: &Menu,
    shortcuts: &dyn ShortcutRegistry,
    options: &DisplayOptions,
    prefix: &str,
    depth: usize,
    out: &mut String,
) {
    let count = menu.len();
    for (i, entry) in menu.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└─" } else { "├─" };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&entry_line(entry, shortcuts, options));
        out.push('\n');

        let Some(child) = entry.child() else {
            continue;
        };
        if options.max_depth.is_some_and(|max| depth + 1 > max) {
            continue;
        }
        let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
        render_entries(child, shortcuts, options, &child_prefix, depth + 1, out);
    }
}

fn entry_line(entry: &MenuEntry, shortcuts: &dyn ShortcutRegistry, options: &DisplayOptions) -> String {
    if entry.is_separator() {
        return paint("────────", options, |s| s.dimmed().to_string());
    }

    let mut line = String::new();
    match entry.status.checked {
        Some(true) => line.push_str("[x] "),
        Some(false) => line.push_str("[ ] "),
        None => {}
    }
    line.push_str(entry.label());
    if !entry.shortcut().is_empty() {
        line.push_str(&format!(" ({})", entry.shortcut()));
    }
    if entry.is_submenu() {
        line.push_str(" ▸");
    }

    let mut line = if entry.is_submenu() {
        paint(&line, options, |s| s.bold().to_string())
    } else if entry.status.is_enabled() {
        line
    } else {
        paint(&line, options, |s| s.dimmed().to_string())
    };

    if options.show_commands
        && let Some(func) = entry.func()
    {
        let text = format!("  {}", func);
        line.push_str(&paint(&text, options, |s| s.cyan().to_string()));
    }
    if options.show_bindings {
        let binding = entry.binding(shortcuts);
        if !binding.is_empty() {
            let text = format!("  [{}]", binding);
            line.push_str(&paint(&text, options, |s| s.yellow().to_string()));
        }
    }
    line
}

fn paint(text: &str, options: &DisplayOptions, style: impl Fn(&str) -> String) -> String {
    if options.plain {
        text.to_string()
    } else {
        style(text)
    }
}

/// A serializable view of an expanded entry, for machine-readable output.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EntryView {
    /// `command`, `submenu` or `separator`.
    pub kind: &'static str,
    /// Display text without the accelerator hint.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// The accelerator hint.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub shortcut: String,
    /// The action request of a command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// The first key binding of a command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub binding: String,
    /// Whether the entry can be activated.
    pub enabled: bool,
    /// Check state of checkable commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// The expanded entries of a submenu.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<EntryView>,
}

/// Converts an expanded menu into serializable views.
pub fn menu_view(menu: &Menu, shortcuts: &dyn ShortcutRegistry) -> Vec<EntryView> {
    menu.iter()
        .map(|entry| {
            let kind = if entry.is_separator() {
                "separator"
            } else if entry.is_submenu() {
                "submenu"
            } else {
                "command"
            };
            EntryView {
                kind,
                label: entry.label().to_string(),
                shortcut: entry.shortcut().to_string(),
                command: entry.func().map(ToString::to_string),
                binding: entry.binding(shortcuts),
                enabled: entry.status.is_enabled(),
                checked: entry.status.checked,
                entries: entry
                    .child()
                    .map(|child| menu_view(child, shortcuts))
                    .unwrap_or_default(),
            }
        })
        .collect()
}
