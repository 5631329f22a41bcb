// src/cli/handlers/mod.rs

// One module per CLI command.

/// `menuset cache`.
pub mod cache;
/// `menuset check`.
pub mod check;
/// Helpers shared by the handlers.
pub mod commons;
/// `menuset list`.
pub mod list;
/// `menuset show`.
pub mod show;
