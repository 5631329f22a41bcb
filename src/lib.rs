//! Declarative menu definitions with on-demand, context-aware expansion.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
/// Limits, file names and well-known action identifiers.
pub mod constants;
pub mod core;
/// Plain data records shared by the engine and its collaborators.
pub mod models;
pub mod system;
