//! # Table of Contents
//!
//! Turns the flat, depth-annotated table of contents of a document into a
//! menu hierarchy small enough to navigate.
//!
//! A range of at most [`MAX_TOC_ITEMS_PER_PAGE`] entries is shown flat, with
//! deeper entries indented. A larger range is split into groups, each one an
//! entry at the current depth followed by all its deeper descendants; every
//! group of more than one entry becomes a submenu partitioned the same way one
//! level down. Each recursive call works on a strictly smaller range, so the
//! recursion always terminates.

use crate::{
    constants::{MAX_NUMBERED_ENTRIES, MAX_TOC_ITEMS_PER_PAGE, TOC_HEADINGS_LIST, TOC_LABEL_LIMIT},
    core::{
        context::Document,
        entry::MenuEntry,
        menu::{Menu, enabled_command, placeholder},
    },
    models::{ActionRequest, FuncStatus, TocItem},
};

const ELLIPSIS: &str = "...";

/// Elides `label` to [`TOC_LABEL_LIMIT`] characters, ending it with `...`.
pub fn limit_string_length(label: &str) -> String {
    if label.chars().count() <= TOC_LABEL_LIMIT {
        return label.to_string();
    }
    let keep = TOC_LABEL_LIMIT.saturating_sub(ELLIPSIS.len());
    let mut elided: String = label.chars().take(keep).collect();
    elided.push_str(ELLIPSIS);
    elided
}

/// Appends the table-of-contents entries of `document` to `dest`.
///
/// A child document first gets an entry for its master document. Every float
/// list then becomes a submenu, followed by the headings partitioned with
/// [`expand_toc2`]. A document without headings gets a disabled placeholder.
pub fn expand_toc(dest: &mut Menu, document: &dyn Document) {
    if let Some(master) = document.master_link() {
        dest.add(enabled_command(t!("menu.label.master_document"), master));
        dest.add(MenuEntry::separator());
    }

    let lists = document.toc_lists();
    let float_types = document.float_types();

    for list in lists.iter().filter(|l| l.kind != TOC_HEADINGS_LIST) {
        let label = float_types
            .iter()
            .find(|f| f.kind == list.kind)
            .map_or_else(|| list.kind.clone(), |f| f.list_name.clone());

        let mut submenu = Menu::new(list.kind.clone());
        for item in &list.items {
            submenu.add(enabled_command(
                limit_string_length(&item.text),
                item.action.clone(),
            ));
        }

        let mut entry = MenuEntry::submenu(label, list.kind.clone());
        let mut status = FuncStatus::default();
        status.set_enabled(!submenu.is_empty());
        entry.set_child(submenu);
        dest.add(entry.with_status(status));
    }

    match lists.iter().find(|l| l.kind == TOC_HEADINGS_LIST) {
        Some(headings) if !headings.items.is_empty() => {
            log::trace!("Partitioning {} headings.", headings.items.len());
            expand_toc2(dest, &headings.items, 0, headings.items.len(), 0);
        }
        _ => {
            dest.add(placeholder(t!("menu.placeholder.no_toc")));
        }
    }
}

/// Appends the entries `[from, to)` of `items` to `dest`, partitioned as
/// described in the module documentation. `depth` is raised to the smallest
/// depth in the range.
pub fn expand_toc2(dest: &mut Menu, items: &[TocItem], from: usize, to: usize, depth: i32) {
    let to = to.min(items.len());
    let Some(range) = items.get(from..to) else {
        return;
    };
    let depth = range.iter().map(|i| i.depth).min().map_or(depth, |min| depth.max(min));
    let mut counter = 0;

    if range.len() <= MAX_TOC_ITEMS_PER_PAGE {
        for item in range {
            let label = toc_label(item, depth, &mut counter);
            dest.add(enabled_command(label, item.action.clone()));
        }
        return;
    }

    let groups = toc_groups(items, from, to, depth);
    if groups.iter().all(|&(start, end)| end == start + 1) {
        // Nothing to group by: page the range instead.
        for (page, chunk) in range.chunks(MAX_TOC_ITEMS_PER_PAGE).enumerate() {
            let start = from + page * MAX_TOC_ITEMS_PER_PAGE;
            let label = chunk.first().map(|i| toc_label(i, depth, &mut 0));
            let mut child = Menu::new("");
            expand_toc2(&mut child, items, start, start + chunk.len(), depth);
            dest.add(toc_submenu(label.unwrap_or_default(), child));
        }
        return;
    }

    for (pos, new_pos) in groups {
        let Some(head) = items.get(pos) else {
            continue;
        };
        let label = toc_label(head, depth, &mut counter);
        if new_pos == pos + 1 {
            dest.add(enabled_command(label, head.action.clone()));
        } else {
            let mut child = Menu::new("");
            child.add(enabled_command(
                limit_string_length(&head.text),
                head.action.clone(),
            ));
            expand_toc2(&mut child, items, pos + 1, new_pos, depth + 1);
            dest.add(toc_submenu(label, child));
        }
    }
}

/// Splits `[from, to)` into `(start, end)` groups: an entry plus every
/// following entry deeper than `depth`.
fn toc_groups(items: &[TocItem], from: usize, to: usize, depth: i32) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut pos = from;
    while pos < to {
        let mut end = pos + 1;
        while end < to && items.get(end).is_some_and(|i| i.depth > depth) {
            end += 1;
        }
        groups.push((pos, end));
        pos = end;
    }
    groups
}

/// Indents and elides an entry's text and, for entries at `depth`, appends the
/// next digit mnemonic when that digit already occurs in the label.
fn toc_label(item: &TocItem, depth: i32, counter: &mut usize) -> String {
    let indent = usize::try_from(item.depth.saturating_sub(depth).max(0)).unwrap_or(0);
    let mut label = limit_string_length(&format!("{}{}", " ".repeat(4 * indent), item.text));
    if item.depth == depth && *counter < MAX_NUMBERED_ENTRIES {
        let digit = (*counter + 1).to_string();
        if label.contains(&digit) {
            label.push('|');
            label.push_str(&digit);
            *counter += 1;
        }
    }
    label
}

fn toc_submenu(label: String, child: Menu) -> MenuEntry {
    let mut entry = MenuEntry::submenu(label, "");
    entry.set_child(child);
    entry.with_status(FuncStatus::enabled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FloatType, Format, InsetLayout, TocList};

    fn item(depth: i32, text: &str) -> TocItem {
        TocItem {
            depth,
            text: text.to_string(),
            action: ActionRequest::new("paragraph-goto", text),
        }
    }

    fn partition(items: &[TocItem]) -> Menu {
        let mut menu = Menu::new("toc");
        expand_toc2(&mut menu, items, 0, items.len(), 0);
        menu
    }

    /// Checks that no range handed to a submenu is as large as its parent.
    fn assert_strictly_smaller(menu: &Menu, parent_size: usize) {
        for entry in menu {
            if let Some(child) = entry.child() {
                let size = count_commands(child);
                assert!(size < parent_size, "{} !< {}", size, parent_size);
                assert_strictly_smaller(child, size);
            }
        }
    }

    fn count_commands(menu: &Menu) -> usize {
        menu.iter()
            .map(|e| e.child().map_or(1, count_commands))
            .sum()
    }

    #[test]
    fn test_limit_string_length() {
        let short = "Introduction";
        assert_eq!(limit_string_length(short), short);

        let exact = "x".repeat(TOC_LABEL_LIMIT);
        assert_eq!(limit_string_length(&exact), exact);

        let long = "y".repeat(TOC_LABEL_LIMIT + 10);
        let elided = limit_string_length(&long);
        assert_eq!(elided.chars().count(), TOC_LABEL_LIMIT);
        assert!(elided.ends_with("..."));
    }

    #[test]
    fn test_small_range_is_flat_and_indented() {
        let items = vec![
            item(1, "1 Intro"),
            item(2, "1.1 Scope"),
            item(1, "2 Method"),
        ];
        let menu = partition(&items);
        let labels: Vec<&str> = menu.iter().map(MenuEntry::full_label).collect();
        assert_eq!(labels, vec!["1 Intro|1", "    1.1 Scope", "2 Method|2"]);
        assert!(menu.iter().all(|e| e.is_command() && e.status.is_enabled()));
    }

    #[test]
    fn test_flat_size_bound() {
        for n in [1, 10, MAX_TOC_ITEMS_PER_PAGE] {
            let items: Vec<TocItem> = (0..n).map(|i| item(1 + (i % 3) as i32, "s")).collect();
            let menu = partition(&items);
            assert_eq!(menu.len(), n);
            assert!(menu.iter().all(|e| !e.is_submenu()));
        }
    }

    #[test]
    fn test_large_range_is_grouped() {
        let mut items = Vec::new();
        for chapter in 1..=4 {
            items.push(item(0, &format!("Chapter {}", chapter)));
            for section in 1..=10 {
                items.push(item(1, &format!("Section {}.{}", chapter, section)));
            }
        }
        let menu = partition(&items);
        assert_eq!(menu.len(), 4);
        assert!(menu.iter().all(MenuEntry::is_submenu));

        let first = menu.entries()[0].child().map(|c| c.len());
        // The heading itself, then its ten sections.
        assert_eq!(first, Some(11));
        assert_eq!(menu.entries()[0].full_label(), "Chapter 1|1");
        assert_eq!(menu.entries()[1].full_label(), "Chapter 2|2");
        assert_strictly_smaller(&menu, items.len());
    }

    #[test]
    fn test_large_flat_range_is_paged() {
        let items: Vec<TocItem> = (0..60).map(|i| item(2, &format!("Item {}", i))).collect();
        let menu = partition(&items);
        assert_eq!(menu.len(), 3);
        assert!(menu.iter().all(MenuEntry::is_submenu));
        let sizes: Vec<usize> = menu.iter().filter_map(|e| e.child().map(Menu::len)).collect();
        assert_eq!(sizes, vec![25, 25, 10]);
        assert_eq!(menu.entries()[2].label(), "Item 50");
        assert_strictly_smaller(&menu, items.len());
    }

    #[test]
    fn test_mixed_large_range_has_submenu_and_terminates() {
        let mut items = vec![item(0, "Preface")];
        items.extend((0..40).map(|i| item(1 + (i % 4), &format!("Deep {}", i))));
        items.push(item(0, "Appendix"));
        let menu = partition(&items);
        assert_eq!(menu.len(), 2);
        assert!(menu.entries()[0].is_submenu());
        assert!(menu.entries()[1].is_command());
        assert_strictly_smaller(&menu, items.len());
    }

    #[test]
    fn test_large_range_of_single_entry_groups_is_paged() {
        // A deeper first entry makes every group a single entry without the
        // range being flat.
        let mut items = vec![item(2, "Foreword")];
        items.extend((1..=30).map(|i| item(1, &format!("Chapter {}", i))));
        let menu = partition(&items);
        assert_eq!(menu.len(), 2);
        assert!(menu.iter().all(MenuEntry::is_submenu));
        let sizes: Vec<usize> = menu.iter().filter_map(|e| e.child().map(Menu::len)).collect();
        assert_eq!(sizes, vec![25, 6]);
        assert_strictly_smaller(&menu, items.len());
    }

    #[test]
    fn test_every_large_range_has_a_submenu_and_shrinks() {
        let layouts: [fn(usize) -> i32; 6] = [
            |_| 1,
            |i| if i == 0 { 3 } else { 1 },
            |i| (i % 2) as i32,
            |i| ((i * 7) % 5) as i32,
            |i| 4 - (i % 5) as i32,
            |i| if i % 13 == 0 { 0 } else { 2 },
        ];
        for layout in layouts {
            for n in 26..=60 {
                let items: Vec<TocItem> =
                    (0..n).map(|i| item(layout(i), &format!("Entry {}", i))).collect();
                let menu = partition(&items);
                assert!(
                    menu.iter().any(MenuEntry::is_submenu),
                    "n = {} produced no submenu",
                    n
                );
                assert_eq!(count_commands(&menu), n);
                assert_strictly_smaller(&menu, n);
            }
        }
    }

    #[test]
    fn test_mnemonic_bound() {
        let items: Vec<TocItem> = (1..=20).map(|i| item(0, &format!("Part {}", i))).collect();
        let menu = partition(&items);

        let mut used = Vec::new();
        for entry in &menu {
            let shortcut = entry.shortcut();
            if !shortcut.is_empty() {
                assert!(entry.label().contains(shortcut));
                used.push(shortcut.parse::<usize>().unwrap());
            }
        }
        assert_eq!(used, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_mnemonic_heuristic_may_assign_nothing() {
        let items = vec![item(0, "Alpha"), item(0, "Beta 2"), item(0, "Gamma 1")];
        let menu = partition(&items);
        // Only a label containing the next digit gets a mnemonic.
        let shortcuts: Vec<&str> = menu.iter().map(MenuEntry::shortcut).collect();
        assert_eq!(shortcuts, vec!["", "", "1"]);
    }

    struct Doc {
        lists: Vec<TocList>,
        master: Option<ActionRequest>,
    }

    impl Document for Doc {
        fn toc_lists(&self) -> Vec<TocList> {
            self.lists.clone()
        }
        fn float_types(&self) -> Vec<FloatType> {
            vec![FloatType {
                kind: "figure".into(),
                name: "Figure".into(),
                list_name: "List of Figures".into(),
            }]
        }
        fn inset_layouts(&self) -> Vec<InsetLayout> {
            Vec::new()
        }
        fn branches(&self) -> Vec<String> {
            Vec::new()
        }
        fn exportable_formats(&self, _viewable_only: bool) -> Vec<Format> {
            Vec::new()
        }
        fn master_link(&self) -> Option<ActionRequest> {
            self.master.clone()
        }
    }

    #[test]
    fn test_expand_toc_with_floats_and_master() {
        let doc = Doc {
            lists: vec![
                TocList {
                    kind: "figure".into(),
                    items: vec![item(0, "A plot")],
                },
                TocList {
                    kind: "table".into(),
                    items: Vec::new(),
                },
                TocList {
                    kind: TOC_HEADINGS_LIST.into(),
                    items: vec![item(0, "Intro")],
                },
            ],
            master: Some(ActionRequest::new("buffer-switch", "/master.lyx")),
        };
        let mut menu = Menu::new("toc");
        expand_toc(&mut menu, &doc);

        let labels: Vec<&str> = menu.iter().map(MenuEntry::label).collect();
        assert_eq!(
            labels,
            vec!["Master Document", "", "List of Figures", "table", "Intro"]
        );
        assert!(menu.entries()[2].status.is_enabled());
        assert!(!menu.entries()[3].status.is_enabled());
    }

    #[test]
    fn test_expand_toc_without_headings_shows_placeholder() {
        let doc = Doc {
            lists: Vec::new(),
            master: None,
        };
        let mut menu = Menu::new("toc");
        expand_toc(&mut menu, &doc);
        assert_eq!(menu.len(), 1);
        let entry = &menu.entries()[0];
        assert_eq!(entry.label(), "No Table of contents");
        assert!(entry.func().is_some_and(ActionRequest::is_noaction));
        assert!(!entry.status.is_enabled());
    }
}
