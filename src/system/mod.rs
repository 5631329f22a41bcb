//! # System Layer
//!
//! Everything read from the user's environment rather than from UI files.
//!
//! ## Modules
//!
//! - **`settings`**: Loads `settings.toml` from the config directory: the default UI
//!   file and the template cache location.
//! - **`snapshot`**: A TOML description of application state (recent files, open
//!   documents, the current document, command statuses, key bindings) that menus can be
//!   expanded against from the command line.

/// User settings.
pub mod settings;
/// Context snapshots.
pub mod snapshot;
