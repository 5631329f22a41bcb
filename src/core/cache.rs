// src/core/cache.rs

use crate::{
    constants::CACHE_FILE_EXTENSION,
    core::registry::MenuRegistry,
};
use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const HASH_TRUNCATE_LENGTH: usize = 16; // 16 bytes = 32 hex characters

/// Format version of cache files; files written by other versions are stale.
const CACHE_FORMAT: &str = env!("CARGO_PKG_VERSION");

/// A source file that went into a compiled template set, with the hash of the
/// content that was read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceHash {
    /// Canonical path of the file.
    pub path: PathBuf,
    /// Truncated blake3 hash of the content, hex encoded.
    pub content_hash: String,
}

impl SourceHash {
    /// Hashes `content` as read from `path`.
    pub fn new(path: PathBuf, content: &[u8]) -> Self {
        Self {
            path,
            content_hash: content_hash(content),
        }
    }

    /// True if the file still has the hashed content.
    pub fn is_current(&self) -> bool {
        match fs::read(&self.path) {
            Ok(content) => content_hash(&content) == self.content_hash,
            Err(_) => false,
        }
    }
}

/// The on-disk form of a parsed template set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CachedTemplates {
    /// Crate version that wrote the file.
    pub format: String,
    /// Every file read, with its content hash.
    pub sources: Vec<SourceHash>,
    /// The `*.ui` fragments of a directory root, in reading order. Empty for
    /// a single-file root.
    pub fragments: Vec<PathBuf>,
    /// Include targets that could not be read.
    pub missing: Vec<PathBuf>,
    /// The parsed templates.
    pub registry: MenuRegistry,
}

impl CachedTemplates {
    /// A cache record for `registry`, read from `sources`.
    pub fn new(sources: Vec<SourceHash>, registry: MenuRegistry) -> Self {
        Self {
            format: CACHE_FORMAT.to_string(),
            sources,
            fragments: Vec::new(),
            missing: Vec::new(),
            registry,
        }
    }

    /// Records the fragment list of a directory root.
    pub fn with_fragments(mut self, fragments: Vec<PathBuf>) -> Self {
        self.fragments = fragments;
        self
    }

    /// Records include targets that did not exist.
    pub fn with_missing(mut self, missing: Vec<PathBuf>) -> Self {
        self.missing = missing;
        self
    }

    /// True when written by this version, no source has changed, the root
    /// still has exactly `fragments`, and no missing include has appeared.
    pub fn is_fresh(&self, fragments: &[PathBuf]) -> bool {
        if self.format != CACHE_FORMAT {
            return false;
        }
        if self.fragments != fragments {
            debug!("Fragment list changed since the cache was written.");
            return false;
        }
        if let Some(appeared) = self.missing.iter().find(|p| p.exists()) {
            debug!("Include '{}' exists now.", appeared.display());
            return false;
        }
        self.sources.iter().all(SourceHash::is_current)
    }
}

/// Truncated blake3 hash of `content`, hex encoded.
pub fn content_hash(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    let bytes = hash.as_bytes();
    hex::encode(bytes.get(..HASH_TRUNCATE_LENGTH).unwrap_or(bytes))
}

/// The cache file for the UI definitions rooted at `root` (canonical path).
pub fn cache_file_path(cache_dir: &Path, root: &Path) -> PathBuf {
    let key = content_hash(root.to_string_lossy().as_bytes());
    cache_dir.join(key).with_extension(CACHE_FILE_EXTENSION)
}

/// Reads and decodes a cache file.
pub fn read_cached_templates(path: &Path) -> Result<CachedTemplates> {
    let compressed_bytes = fs::read(path)
        .with_context(|| format!("Failed to read cache file at '{}'", path.display()))?;

    if compressed_bytes.is_empty() {
        return Err(anyhow!("Cache file is empty."));
    }

    log::trace!(
        "Decompressing cached templates from {} bytes.",
        compressed_bytes.len()
    );
    let decompressed_bytes = lz4_flex::decompress_size_prepended(&compressed_bytes)
        .map_err(|e| anyhow!("Failed to decompress cache file: {}. It might be corrupt.", e))?;

    let (cached, _): (CachedTemplates, usize) =
        bincode::serde::decode_from_slice(&decompressed_bytes, bincode::config::standard())
            .context("Failed to deserialize cached templates. The cache is likely from an incompatible version.")?;

    Ok(cached)
}

/// Encodes and writes a cache file, creating its directory if needed.
pub fn write_cached_templates(path: &Path, cached: &CachedTemplates) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).with_context(|| {
            format!("Failed to create cache directory '{}'", parent_dir.display())
        })?;
    }

    let encoded = bincode::serde::encode_to_vec(cached, bincode::config::standard())
        .context("Failed to serialize templates for caching.")?;
    let compressed = lz4_flex::compress_prepend_size(&encoded);
    debug!(
        "Writing cached templates to '{}' ({} -> {} bytes).",
        path.display(),
        encoded.len(),
        compressed.len()
    );

    fs::write(path, compressed)
        .with_context(|| format!("Failed to write cache file '{}'", path.display()))
}

/// Removes every cache file from `cache_dir`, returning how many were removed.
pub fn clear_cache(cache_dir: &Path) -> Result<usize> {
    if !cache_dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(cache_dir)
        .with_context(|| format!("Failed to list cache directory '{}'", cache_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == CACHE_FILE_EXTENSION) {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove '{}'", path.display()))?;
            removed += 1;
        }
    }
    debug!("Removed {} cache file(s) from '{}'.", removed, cache_dir.display());
    Ok(removed)
}
