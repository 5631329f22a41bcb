//! # Lexer
//!
//! Tokenizer for menu definition files and the keyword-table stack used by the
//! recursive-descent readers in `menu`, `registry` and `loader`.
//!
//! The token language is deliberately small: whitespace separates tokens,
//! `"..."` quotes a token (with `\"` and `\\` escapes) and `#` starts a comment
//! that runs to the end of the line. Keywords are not global: each grammar
//! production pushes its own [`KeywordTable`] for the duration of its body with
//! [`Lexer::with_table`], so `end` or `item` only mean something where the
//! enclosing production says they do.
//!
//! Malformed input never aborts a read. Problems are logged, collected as
//! [`ParseError`] diagnostics, and the reader resumes at the next token.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    // A comment, a (possibly unterminated) quoted string, or a bare word.
    static ref TOKEN_RE: Regex =
        Regex::new(r##"#[^\n]*|"((?:[^"\\]|\\.)*)("?)|[^\s"#]+"##).expect("token regex is valid");
}

/// Problems found while reading menu definitions. None of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token that is not a keyword of the active production.
    #[error("{file}:{line}: unknown tag `{token}` in {production}")]
    UnknownTag {
        /// Name of the source being read.
        file: String,
        /// Line of the offending token.
        line: usize,
        /// The offending token.
        token: String,
        /// The production whose keyword table was active.
        production: &'static str,
    },
    /// A tag was not followed by the argument it requires.
    #[error("{file}:{line}: missing {expected} after `{after}`")]
    MissingArgument {
        /// Name of the source being read.
        file: String,
        /// Line of the tag missing its argument.
        line: usize,
        /// What the tag expected, e.g. `command`.
        expected: &'static str,
        /// The tag (or previous argument) that needed it.
        after: String,
    },
    /// The input ended before the production's closing `end`.
    #[error("{file}: unexpected end of input inside {production}")]
    UnexpectedEof {
        /// Name of the source being read.
        file: String,
        /// The production left open.
        production: &'static str,
    },
    /// A quoted string was never closed.
    #[error("{file}:{line}: unterminated string")]
    UnterminatedString {
        /// Name of the source being read.
        file: String,
        /// Line where the string starts.
        line: usize,
    },
    /// An `include` could not be followed.
    #[error("{file}:{line}: cannot include `{name}`: {reason}")]
    Include {
        /// Name of the source being read.
        file: String,
        /// Line of the include.
        line: usize,
        /// The requested file.
        name: String,
        /// Why it could not be read.
        reason: String,
    },
}

/// Every keyword of every production of the UI-file grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `include "file"` at the top of a UI file.
    Include,
    /// `menuset ... end`.
    Menuset,
    /// `toolbarset ... end`.
    Toolbarset,
    /// `toolbar ... end`, only seen while skipping a toolbar set.
    Toolbar,
    /// `menubar <body>`.
    Menubar,
    /// `menu "name" <body>`.
    Menu,
    /// `item "label" "command"`.
    Item,
    /// Optional `item`.
    OptItem,
    /// `separator`.
    Separator,
    /// `submenu "label" "name"`.
    Submenu,
    /// Optional `submenu`.
    OptSubmenu,
    /// `lastfiles`.
    LastFiles,
    /// `documents`.
    Documents,
    /// `bookmarks`.
    Bookmarks,
    /// `toc`.
    Toc,
    /// `viewformats`.
    ViewFormats,
    /// `updateformats`.
    UpdateFormats,
    /// `exportformats`.
    ExportFormats,
    /// `importformats`.
    ImportFormats,
    /// `charstyles`.
    CharStyles,
    /// `custom`.
    Custom,
    /// `elements`.
    Elements,
    /// `floatlistinsert`.
    FloatListInsert,
    /// `floatinsert`.
    FloatInsert,
    /// `pasterecent`.
    PasteRecent,
    /// `toolbars`.
    Toolbars,
    /// `branches`.
    Branches,
    /// `end`, closing the active production.
    End,
}

/// The keywords recognised inside one grammar production.
#[derive(Debug)]
pub struct KeywordTable {
    /// Production name, used in diagnostics.
    pub production: &'static str,
    /// Keyword spellings (lowercase) and their tags.
    pub entries: &'static [(&'static str, Tag)],
}

impl KeywordTable {
    /// Looks a word up, ignoring ASCII case.
    pub fn find(&self, word: &str) -> Option<Tag> {
        self.entries
            .iter()
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case(word))
            .map(|(_, tag)| *tag)
    }
}

/// A single token with the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text with quotes removed and escapes resolved.
    pub text: String,
    /// 1-based line number.
    pub line: usize,
    /// True if the token was written in quotes. Quoted tokens are never keywords.
    pub quoted: bool,
}

/// What [`Lexer::lex`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    /// A keyword of the active table.
    Tag(Tag, Token),
    /// A token the active table does not know.
    Unknown(Token),
    /// No tokens left.
    Eof,
}

/// Token stream over one source text, with a stack of active keyword tables.
#[derive(Debug)]
pub struct Lexer {
    file: String,
    tokens: Vec<Token>,
    pos: usize,
    tables: Vec<&'static KeywordTable>,
    diagnostics: Vec<ParseError>,
}

impl Lexer {
    /// Tokenizes `text`. `file` names the source in diagnostics.
    pub fn new(file: impl Into<String>, text: &str) -> Self {
        let file = file.into();
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        let mut line = 1;
        let mut last_end = 0;

        for caps in TOKEN_RE.captures_iter(text) {
            let Some(full) = caps.get(0) else { continue };
            line += count_newlines(text.get(last_end..full.start()).unwrap_or(""));
            last_end = full.end();
            let start_line = line;
            line += count_newlines(full.as_str());

            if full.as_str().starts_with('#') {
                continue;
            }
            match caps.get(1) {
                Some(body) => {
                    let closed = caps.get(2).is_some_and(|q| !q.as_str().is_empty());
                    if !closed {
                        let err = ParseError::UnterminatedString {
                            file: file.clone(),
                            line: start_line,
                        };
                        log::warn!("{}", err);
                        diagnostics.push(err);
                    }
                    tokens.push(Token {
                        text: unescape(body.as_str()),
                        line: start_line,
                        quoted: true,
                    });
                }
                None => tokens.push(Token {
                    text: full.as_str().to_string(),
                    line: start_line,
                    quoted: false,
                }),
            }
        }

        log::trace!("Tokenized '{}' into {} tokens.", file, tokens.len());
        Self {
            file,
            tokens,
            pos: 0,
            tables: Vec::new(),
            diagnostics,
        }
    }

    /// Name of the source, as used in diagnostics.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// True while tokens remain.
    pub fn is_ok(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Runs `body` with `table` as the active keyword table, restoring the
    /// previous table afterwards.
    pub fn with_table<R>(
        &mut self,
        table: &'static KeywordTable,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.tables.push(table);
        log::trace!(
            "{}: entering {} (table depth {})",
            self.file,
            table.production,
            self.tables.len()
        );
        let result = body(self);
        self.tables.pop();
        result
    }

    /// Name of the production whose table is active.
    pub fn production(&self) -> &'static str {
        self.tables.last().map_or("<toplevel>", |t| t.production)
    }

    /// Consumes the next token and classifies it against the active table.
    pub fn lex(&mut self) -> Lexeme {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Lexeme::Eof;
        };
        self.pos += 1;
        match self.keyword(&token) {
            Some(tag) => Lexeme::Tag(tag, token),
            None => Lexeme::Unknown(token),
        }
    }

    /// Consumes the argument following `after`.
    ///
    /// Returns `None`, recording a diagnostic, if the input is exhausted or the
    /// next token is a keyword of the active table. In the latter case the
    /// keyword is left in place so the caller resumes there.
    pub fn next_arg(&mut self, expected: &'static str, after: &Token) -> Option<Token> {
        let next = self.tokens.get(self.pos).cloned();
        match next {
            Some(token) if self.keyword(&token).is_none() => {
                self.pos += 1;
                Some(token)
            }
            _ => {
                self.report(ParseError::MissingArgument {
                    file: self.file.clone(),
                    line: after.line,
                    expected,
                    after: after.text.clone(),
                });
                None
            }
        }
    }

    /// Records an unknown tag in the active production.
    pub fn report_unknown(&mut self, token: &Token) {
        self.report(ParseError::UnknownTag {
            file: self.file.clone(),
            line: token.line,
            token: token.text.clone(),
            production: self.production(),
        });
    }

    /// Records that the input ended inside the active production.
    pub fn report_eof(&mut self) {
        self.report(ParseError::UnexpectedEof {
            file: self.file.clone(),
            production: self.production(),
        });
    }

    /// Logs and collects a diagnostic.
    pub fn report(&mut self, err: ParseError) {
        log::warn!("{}", err);
        self.diagnostics.push(err);
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    /// Consumes the lexer, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<ParseError> {
        self.diagnostics
    }

    fn keyword(&self, token: &Token) -> Option<Tag> {
        if token.quoted {
            return None;
        }
        self.tables.last().and_then(|table| table.find(&token.text))
    }
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

/// Resolves `\"` and `\\` (and any other `\x` to `x`) inside a quoted token.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
