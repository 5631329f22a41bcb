//! # Core
//!
//! The menu engine: the lexer and parser for UI definition files, the menu
//! model and its template registry, and the expander that turns templates into
//! concrete menus against an [`ExpansionContext`](context::ExpansionContext).
//! Loading, caching and display of menus live here as well.

/// Template cache files.
pub mod cache;
pub mod context;
/// Menu entries and their kinds.
pub mod entry;
pub mod expander;
pub mod lexer;
pub mod loader;
/// Menus and the menu body grammar.
pub mod menu;
/// Tree and JSON rendering of expanded menus.
pub mod menu_display;
/// Application directories and display paths.
pub mod paths;
pub mod registry;
pub mod toc;
