// src/cli/handlers/commons.rs

// Shared steps of the handlers: locating the UI file and loading templates.

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use std::path::PathBuf;

use crate::{
    core::{
        context::ActionRegistry,
        loader::{self, LoadOptions, LoadedTemplates},
        paths,
    },
    system::settings::Settings,
};

/// The UI file to read: `--file` first, then the one configured in settings.
pub fn resolve_ui_file(file: Option<String>, settings: &Settings) -> Result<PathBuf> {
    file.map(|f| paths::expand_user_path(&f))
        .or_else(|| settings.ui_file())
        .ok_or_else(|| anyhow!(t!("cli.error.no_ui_file")))
}

/// Cache options derived from settings. `no_cache` bypasses the cache for this
/// run only.
pub fn load_options(settings: &Settings, no_cache: bool) -> LoadOptions {
    if !settings.cache {
        return LoadOptions::default();
    }
    let configured = settings.cache_dir();
    match paths::cache_dir(configured.as_deref()) {
        Ok(dir) => LoadOptions {
            cache_dir: Some(dir),
            no_cache,
        },
        Err(e) => {
            log::warn!("Template cache disabled: {}", e);
            LoadOptions::default()
        }
    }
}

/// Loads settings, resolves the UI file and reads its templates, printing any
/// parse diagnostics as warnings.
pub fn load_templates(
    file: Option<String>,
    no_cache: bool,
    actions: &dyn ActionRegistry,
) -> Result<LoadedTemplates> {
    let settings = Settings::load()?;
    let ui_file = resolve_ui_file(file, &settings)?;
    let options = load_options(&settings, no_cache);
    let loaded = loader::load_templates(&ui_file, actions, &options)
        .with_context(|| format!("Failed to load '{}'", ui_file.display()))?;

    for diagnostic in &loaded.diagnostics {
        eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
    }
    Ok(loaded)
}
