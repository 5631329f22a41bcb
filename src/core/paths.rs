// src/core/paths.rs

use crate::constants::{APP_DIR_NAME, CACHE_DIR_ENV, SETTINGS_FILENAME};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

const ELISION: &str = "...";

/// Failures locating or creating the application directories.
#[derive(Error, Debug)]
pub enum PathError {
    /// The platform has no config directory.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// The platform has no cache directory.
    #[error("Could not find system cache directory.")]
    CacheDirNotFound,
    /// A directory could not be created.
    #[error("Could not create directory at '{path}': {source}")]
    DirCreation {
        /// The directory that was being created.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Returns the configuration directory (`~/.config/menuset` on Linux),
/// creating it if needed.
///
/// Memoized: only the first call touches the filesystem.
pub fn config_dir() -> Result<PathBuf, PathError> {
    // A poisoned lock only means another thread panicked mid-lookup; the
    // cached value is still a plain path.
    let mut cached = CONFIG_DIR.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(APP_DIR_NAME);
    ensure_dir(&path)?;

    *cached = Some(path.clone());
    Ok(path)
}

/// Returns the path of the settings file inside [`config_dir`].
pub fn settings_path() -> Result<PathBuf, PathError> {
    config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

/// Resolves the template cache directory, creating it if needed.
///
/// Precedence: the `MENUSET_CACHE_DIR` environment variable, then `configured`
/// (from the settings file), then the platform cache directory.
pub fn cache_dir(configured: Option<&Path>) -> Result<PathBuf, PathError> {
    let path = match std::env::var_os(CACHE_DIR_ENV) {
        Some(from_env) if !from_env.is_empty() => PathBuf::from(from_env),
        _ => match configured {
            Some(path) => path.to_path_buf(),
            None => dirs::cache_dir()
                .ok_or(PathError::CacheDirNotFound)?
                .join(APP_DIR_NAME),
        },
    };
    ensure_dir(&path)?;
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| PathError::DirCreation {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_user_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(e) => {
            log::warn!("Could not expand '{}': {}. Using it as is.", raw, e);
            PathBuf::from(shellexpand::tilde(raw).into_owned())
        }
    }
}

/// Shortens `path` for display in a menu label.
///
/// The home directory becomes `~`. If the result is still longer than
/// `threshold` characters, leading directories are replaced with `.../` until
/// it fits. If the file name alone is too long, its middle is elided.
pub fn make_display_path(path: &Path, threshold: usize) -> String {
    let home = dirs::home_dir();
    display_path_relative_to(path, home.as_deref(), threshold)
}

fn display_path_relative_to(path: &Path, home: Option<&Path>, threshold: usize) -> String {
    let full = match home.and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    };
    if full.chars().count() <= threshold {
        return full;
    }

    let parts: Vec<&str> = full.split('/').collect();
    let Some((file_name, dirs)) = parts.split_last() else {
        return full;
    };

    // Keep as many trailing directories as fit.
    for skip in 1..=dirs.len() {
        let kept = dirs.get(skip..).unwrap_or_default();
        let mut candidate = String::from(ELISION);
        for dir in kept {
            candidate.push('/');
            candidate.push_str(dir);
        }
        candidate.push('/');
        candidate.push_str(file_name);
        if candidate.chars().count() <= threshold {
            return candidate;
        }
    }

    elide_middle(file_name, threshold)
}

/// Keeps the head and tail of `name` around `...`, within `threshold` chars.
fn elide_middle(name: &str, threshold: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= threshold {
        return name.to_string();
    }
    let room = threshold.saturating_sub(ELISION.len());
    let head = room.div_ceil(2);
    let tail = room - head;
    let mut out: String = chars.iter().take(head).collect();
    out.push_str(ELISION);
    out.extend(chars.iter().skip(chars.len() - tail));
    out
}
