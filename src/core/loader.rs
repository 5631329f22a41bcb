//! # Loader
//!
//! Reads UI definition files into a [`MenuRegistry`].
//!
//! A UI file holds `menuset` blocks, `toolbarset` blocks (skipped here) and
//! `include` directives that pull in other UI files relative to the including
//! one. A directory can be loaded instead of a single file: every `*.ui`
//! fragment below it is read in path order, and fragments naming the same menu
//! extend it.
//!
//! Parsed templates can be cached on disk (see [`cache`](crate::core::cache)).
//! The cache is keyed by the canonical root path and invalidated as soon as any
//! file that went into it changes. Cache problems are logged and never stop a
//! load.

use crate::{
    constants::UI_FILE_EXTENSION,
    core::{
        cache::{self, CachedTemplates, SourceHash},
        context::ActionRegistry,
        lexer::{KeywordTable, Lexeme, Lexer, ParseError, Tag},
        registry::MenuRegistry,
    },
};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

/// Keywords at the top level of a UI file.
static UI_TAGS: KeywordTable = KeywordTable {
    production: "ui file",
    entries: &[
        ("include", Tag::Include),
        ("menuset", Tag::Menuset),
        ("toolbarset", Tag::Toolbarset),
    ],
};

static TOOLBARSET_TAGS: KeywordTable = KeywordTable {
    production: "toolbarset",
    entries: &[("end", Tag::End), ("toolbar", Tag::Toolbar)],
};

static TOOLBAR_TAGS: KeywordTable = KeywordTable {
    production: "toolbar",
    entries: &[("end", Tag::End)],
};

/// Errors that prevent UI definitions from being loaded at all.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The root file or directory does not exist.
    #[error("UI definition '{path}' does not exist.")]
    NotFound {
        /// The path as given.
        path: String,
    },
    /// The root file could not be read.
    #[error("Could not read UI definition '{path}': {source}")]
    Read {
        /// The file.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A fragment directory holds no `*.ui` files.
    #[error("No '*.ui' fragments found below '{path}'.")]
    NoFragments {
        /// The directory.
        path: String,
    },
}

/// Result type of the loader.
pub type LoadResult<T> = Result<T, LoadError>;

/// How [`load_templates`] uses the template cache.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory of the template cache; `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    /// Bypass the cache for this load (it is still rewritten).
    pub no_cache: bool,
}

/// The outcome of a load.
#[derive(Debug)]
pub struct LoadedTemplates {
    /// The templates.
    pub registry: MenuRegistry,
    /// Diagnostics of the parse. Empty when served from the cache.
    pub diagnostics: Vec<ParseError>,
    /// Every file read, in reading order.
    pub sources: Vec<SourceHash>,
    /// The fragments of a directory root; empty for a single file.
    pub fragments: Vec<PathBuf>,
    /// Include targets that could not be read.
    pub missing_includes: Vec<PathBuf>,
    /// True if the templates came from the cache.
    pub from_cache: bool,
}

/// Loads the UI definitions at `root`, through the cache when enabled.
pub fn load_templates(
    root: &Path,
    actions: &dyn ActionRegistry,
    options: &LoadOptions,
) -> LoadResult<LoadedTemplates> {
    let root = canonical(root)?;
    let fragments = list_fragments(&root);
    let cache_file = options
        .cache_dir
        .as_deref()
        .map(|dir| cache::cache_file_path(dir, &root));

    if let Some(file) = &cache_file
        && !options.no_cache
    {
        match cache::read_cached_templates(file) {
            Ok(cached) if cached.is_fresh(&fragments) => {
                log::debug!("Cache HIT for '{}' at '{}'.", root.display(), file.display());
                return Ok(LoadedTemplates {
                    registry: cached.registry,
                    diagnostics: Vec::new(),
                    sources: cached.sources,
                    fragments: cached.fragments,
                    missing_includes: cached.missing,
                    from_cache: true,
                });
            }
            Ok(_) => log::debug!("Cache for '{}' is stale.", root.display()),
            Err(e) => log::debug!("Cache MISS for '{}': {:#}", root.display(), e),
        }
    }

    let loaded = read_ui_file(&root, actions)?;

    if let Some(file) = &cache_file {
        let cached = CachedTemplates::new(loaded.sources.clone(), loaded.registry.clone())
            .with_fragments(loaded.fragments.clone())
            .with_missing(loaded.missing_includes.clone());
        if let Err(e) = cache::write_cached_templates(file, &cached) {
            log::warn!("Could not cache templates for '{}': {:#}", root.display(), e);
        }
    }
    Ok(loaded)
}

/// Parses the UI file or fragment directory at `root`, without the cache.
pub fn read_ui_file(root: &Path, actions: &dyn ActionRegistry) -> LoadResult<LoadedTemplates> {
    let root = canonical(root)?;
    let mut reader = UiReader::new(actions);

    let fragments = list_fragments(&root);

    if root.is_dir() {
        if fragments.is_empty() {
            return Err(LoadError::NoFragments {
                path: root.display().to_string(),
            });
        }
        for fragment in &fragments {
            reader.read_root(fragment)?;
        }
    } else {
        reader.read_root(&root)?;
    }

    log::debug!(
        "Read {} menus from {} file(s) with {} diagnostic(s).",
        reader.registry.menus().len(),
        reader.sources.len(),
        reader.diagnostics.len()
    );
    Ok(LoadedTemplates {
        registry: reader.registry,
        diagnostics: reader.diagnostics,
        sources: reader.sources,
        fragments,
        missing_includes: reader.missing,
        from_cache: false,
    })
}

/// The `*.ui` fragments below a directory root, in path order. Empty when
/// `root` is a file.
fn list_fragments(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == UI_FILE_EXTENSION))
        .collect()
}

fn canonical(path: &Path) -> LoadResult<PathBuf> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.display().to_string(),
        });
    }
    dunce::canonicalize(path).map_err(|e| LoadError::Read {
        path: path.display().to_string(),
        source: e,
    })
}

/// Resolves an `include` argument against the including file's directory.
fn include_path(base_dir: &Path, name: &str) -> PathBuf {
    let path = base_dir.join(name);
    if path.extension().is_none() {
        path.with_extension(UI_FILE_EXTENSION)
    } else {
        path
    }
}

struct UiReader<'a> {
    actions: &'a dyn ActionRegistry,
    registry: MenuRegistry,
    diagnostics: Vec<ParseError>,
    sources: Vec<SourceHash>,
    missing: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl<'a> UiReader<'a> {
    fn new(actions: &'a dyn ActionRegistry) -> Self {
        Self {
            actions,
            registry: MenuRegistry::new(),
            diagnostics: Vec::new(),
            sources: Vec::new(),
            missing: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn read_root(&mut self, path: &Path) -> LoadResult<()> {
        let content = fs::read_to_string(path).map_err(|e| LoadError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        self.read_content(path, &content);
        Ok(())
    }

    fn read_content(&mut self, path: &Path, content: &str) {
        if !self.seen.insert(path.to_path_buf()) {
            log::debug!("'{}' was already read; skipping.", path.display());
            return;
        }
        self.sources
            .push(SourceHash::new(path.to_path_buf(), content.as_bytes()));

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut lexer = Lexer::new(path.display().to_string(), content);
        lexer.with_table(&UI_TAGS, |lex| {
            loop {
                match lex.lex() {
                    Lexeme::Tag(Tag::Menuset, _) => self.registry.read(lex, self.actions),
                    Lexeme::Tag(Tag::Toolbarset, _) => skip_toolbarset(lex),
                    Lexeme::Tag(Tag::Include, token) => {
                        if let Some(name) = lex.next_arg("file name", &token) {
                            self.include(lex, &base_dir, &name.text, name.line);
                        }
                    }
                    Lexeme::Tag(_, token) | Lexeme::Unknown(token) => lex.report_unknown(&token),
                    Lexeme::Eof => break,
                }
            }
        });
        self.diagnostics.extend(lexer.into_diagnostics());
    }

    fn include(&mut self, lex: &mut Lexer, base_dir: &Path, name: &str, line: usize) {
        let path = include_path(base_dir, name);
        let result = dunce::canonicalize(&path)
            .and_then(|canonical| fs::read_to_string(&canonical).map(|text| (canonical, text)));
        match result {
            Ok((canonical, text)) => {
                log::debug!("Including '{}'.", canonical.display());
                self.read_content(&canonical, &text);
            }
            Err(e) => {
                lex.report(ParseError::Include {
                    file: lex.file().to_string(),
                    line,
                    name: name.to_string(),
                    reason: e.to_string(),
                });
                self.missing.push(path);
            }
        }
    }
}

/// Skips a `toolbarset` block, nested `toolbar` blocks included.
fn skip_toolbarset(lex: &mut Lexer) {
    log::debug!("{}: skipping toolbar definitions.", lex.file());
    lex.with_table(&TOOLBARSET_TAGS, |lex| {
        loop {
            match lex.lex() {
                Lexeme::Tag(Tag::End, _) => return,
                Lexeme::Tag(Tag::Toolbar, _) => {
                    lex.with_table(&TOOLBAR_TAGS, |lex| {
                        loop {
                            match lex.lex() {
                                Lexeme::Tag(Tag::End, _) => return,
                                Lexeme::Eof => {
                                    lex.report_eof();
                                    return;
                                }
                                _ => {}
                            }
                        }
                    });
                }
                Lexeme::Eof => {
                    lex.report_eof();
                    return;
                }
                _ => {}
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::snapshot::ActionTable;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_include_and_toolbarset() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "stdmenus.inc",
            r#"menuset menu "file" item "Open" "buffer-open" end end"#,
        );
        let root = write(
            tmp.path(),
            "default.ui",
            r#"
            include "stdmenus.inc"
            include "missing"
            toolbarset
              toolbar "standard" "Standard"
                item "New" "buffer-new"
              end
            end
            menuset menubar submenu "File" "file" end end
            "#,
        );

        let loaded = read_ui_file(&root, &ActionTable::default()).unwrap();
        assert!(loaded.registry.has_menu("file"));
        assert_eq!(loaded.registry.menubar().len(), 1);
        assert_eq!(loaded.sources.len(), 2);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(matches!(
            &loaded.diagnostics[0],
            ParseError::Include { name, .. } if name == "missing"
        ));
        assert_eq!(loaded.missing_includes.len(), 1);
        assert!(loaded.missing_includes[0].ends_with("missing.ui"));
    }

    #[test]
    fn test_each_file_is_read_once() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "common.ui",
            r#"menuset menu "edit" item "Undo" "undo" end end"#,
        );
        let root = write(
            tmp.path(),
            "main.ui",
            r#"include "common" include "common.ui""#,
        );
        let loaded = read_ui_file(&root, &ActionTable::default()).unwrap();
        assert_eq!(loaded.registry.get_menu("edit").map(|m| m.len()), Some(1));
        assert_eq!(loaded.sources.len(), 2);
    }

    #[test]
    fn test_fragment_directory_extends_menus() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "10-base.ui",
            r#"menuset menubar submenu "Tools" "tools" end menu "tools" item "Spell" "spell" end end"#,
        );
        write(
            tmp.path(),
            "plugins/20-extra.ui",
            r#"menuset menu "tools" item "Count" "count" end end"#,
        );
        write(tmp.path(), "README.txt", "not a fragment");

        let loaded = read_ui_file(tmp.path(), &ActionTable::default()).unwrap();
        let tools: Vec<String> = loaded
            .registry
            .get_menu("tools")
            .map(|m| m.iter().map(|e| e.label().to_string()).collect())
            .unwrap_or_default();
        assert_eq!(tools, vec!["Spell".to_string(), "Count".to_string()]);
        assert_eq!(loaded.sources.len(), 2);
    }

    #[test]
    fn test_missing_root_and_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_ui_file(&tmp.path().join("nope.ui"), &ActionTable::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        let err = read_ui_file(tmp.path(), &ActionTable::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoFragments { .. }));
    }

    #[test]
    fn test_cache_hit_and_invalidation() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_dir = tmp.path().join("cache");
        let root = write(
            tmp.path(),
            "menus/default.ui",
            r#"menuset menu "file" item "Open" "buffer-open" end end"#,
        );
        let options = LoadOptions {
            cache_dir: Some(cache_dir.clone()),
            no_cache: false,
        };
        let actions = ActionTable::default();

        let first = load_templates(&root, &actions, &options).unwrap();
        assert!(!first.from_cache);
        let second = load_templates(&root, &actions, &options).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.registry, first.registry);

        let bypass = LoadOptions {
            no_cache: true,
            ..options.clone()
        };
        assert!(!load_templates(&root, &actions, &bypass).unwrap().from_cache);

        write(
            tmp.path(),
            "menus/default.ui",
            r#"menuset menu "file" item "Close" "buffer-close" end end"#,
        );
        let third = load_templates(&root, &actions, &options).unwrap();
        assert!(!third.from_cache);
        assert_eq!(
            third.registry.get_menu("file").map(|m| m.entries()[0].label().to_string()),
            Some("Close".to_string())
        );
    }

    #[test]
    fn test_cache_sees_new_fragments() {
        let tmp = tempfile::tempdir().unwrap();
        let menus = tmp.path().join("menus");
        write(
            &menus,
            "10-base.ui",
            r#"menuset menu "tools" item "Spell" "spell" end end"#,
        );
        let options = LoadOptions {
            cache_dir: Some(tmp.path().join("cache")),
            no_cache: false,
        };
        let actions = ActionTable::default();

        assert!(!load_templates(&menus, &actions, &options).unwrap().from_cache);
        assert!(load_templates(&menus, &actions, &options).unwrap().from_cache);

        write(
            &menus,
            "20-extra.ui",
            r#"menuset menu "tools" item "Count" "count" end end"#,
        );
        let reloaded = load_templates(&menus, &actions, &options).unwrap();
        assert!(!reloaded.from_cache);
        assert_eq!(reloaded.fragments.len(), 2);
        assert_eq!(reloaded.registry.get_menu("tools").map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_cache_sees_an_include_that_appears() {
        let tmp = tempfile::tempdir().unwrap();
        let root = write(
            tmp.path(),
            "default.ui",
            r#"include "late" menuset menu "file" item "Open" "file-open" end end"#,
        );
        let options = LoadOptions {
            cache_dir: Some(tmp.path().join("cache")),
            no_cache: false,
        };
        let actions = ActionTable::default();

        let first = load_templates(&root, &actions, &options).unwrap();
        assert_eq!(first.diagnostics.len(), 1);
        assert!(load_templates(&root, &actions, &options).unwrap().from_cache);

        write(
            tmp.path(),
            "late.ui",
            r#"menuset menu "edit" item "Undo" "undo" end end"#,
        );
        let reloaded = load_templates(&root, &actions, &options).unwrap();
        assert!(!reloaded.from_cache);
        assert!(reloaded.registry.has_menu("edit"));
        assert!(reloaded.diagnostics.is_empty());
    }

    #[test]
    fn test_corrupt_cache_falls_back_to_parsing() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_dir = tmp.path().join("cache");
        let root = write(tmp.path(), "a.ui", r#"menuset menu "m" end end"#);
        let canonical_root = dunce::canonicalize(&root).unwrap();
        fs::create_dir_all(&cache_dir).unwrap();
        // A small size prefix followed by bytes that are not valid lz4.
        fs::write(
            cache::cache_file_path(&cache_dir, &canonical_root),
            b"\x08\x00\x00\x00\xff\xff\xff",
        )
        .unwrap();
        let options = LoadOptions {
            cache_dir: Some(cache_dir),
            no_cache: false,
        };
        let loaded = load_templates(&root, &ActionTable::default(), &options).unwrap();
        assert!(!loaded.from_cache);
        assert!(loaded.registry.has_menu("m"));
    }
}
