//! Bulk import staging
//!
//! Entries reach the store in bulk two ways:
//! - pasted text, split with user-chosen delimiters ([`ImportList::parse_text`])
//!   and then checked against the canonical `term: definition` per line format
//!   ([`ImportList::validate_entries`])
//! - rows read from another Lexes database ([`ImportList::import_db`])
//!
//! Either way the entries are staged first and written by
//! [`ImportList::import_and_clear`]. Each insert commits on its own, so a failure
//! partway leaves the earlier rows stored.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;

use crate::db;
use crate::lookup::{find_definition, DefinitionLookup};
use crate::models::{timestamp_now, Entry};
use crate::{LexesHandle, Result};

/// Preset separators between entries in pasted text (regular expressions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryDelimiter {
    /// One or more line breaks
    #[default]
    LineBreak,
    Semicolon,
    Comma,
}

impl EntryDelimiter {
    pub fn pattern(self) -> &'static str {
        match self {
            EntryDelimiter::LineBreak => "\n+",
            EntryDelimiter::Semicolon => ";",
            EntryDelimiter::Comma => ",",
        }
    }
}

impl FromStr for EntryDelimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" | "linebreak" | "newline" => Ok(EntryDelimiter::LineBreak),
            "semicolon" => Ok(EntryDelimiter::Semicolon),
            "comma" => Ok(EntryDelimiter::Comma),
            other => Err(format!(
                "unknown entry delimiter '{}', expected line, semicolon or comma",
                other
            )),
        }
    }
}

impl fmt::Display for EntryDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryDelimiter::LineBreak => "line",
            EntryDelimiter::Semicolon => "semicolon",
            EntryDelimiter::Comma => "comma",
        };
        f.write_str(name)
    }
}

/// Preset separators between term and definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TermDefinitionDelimiter {
    #[default]
    Colon,
    Hyphen,
    Equals,
}

impl TermDefinitionDelimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            TermDefinitionDelimiter::Colon => ":",
            TermDefinitionDelimiter::Hyphen => "-",
            TermDefinitionDelimiter::Equals => "=",
        }
    }
}

impl FromStr for TermDefinitionDelimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "colon" | ":" => Ok(TermDefinitionDelimiter::Colon),
            "hyphen" | "-" => Ok(TermDefinitionDelimiter::Hyphen),
            "equals" | "=" => Ok(TermDefinitionDelimiter::Equals),
            other => Err(format!(
                "unknown term/definition delimiter '{}', expected colon, hyphen or equals",
                other
            )),
        }
    }
}

impl fmt::Display for TermDefinitionDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TermDefinitionDelimiter::Colon => "colon",
            TermDefinitionDelimiter::Hyphen => "hyphen",
            TermDefinitionDelimiter::Equals => "equals",
        };
        f.write_str(name)
    }
}

/// Result of a lenient parse of pasted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// False when any pair still lacks a term or a definition
    pub success: bool,
    /// Every parsed `(term, definition)` pair, complete or not
    pub pairs: Vec<(String, String)>,
}

impl ParseOutcome {
    /// Text to put back in front of the user
    ///
    /// A successful parse is rewritten in the canonical `term: definition`
    /// form that [`ImportList::validate_entries`] accepts. A failed one keeps
    /// the user's own delimiter so the gaps can be filled in.
    pub fn render(&self, term_definition_delimiter: &str) -> String {
        let mut text = String::new();
        for (term, definition) in &self.pairs {
            if self.success {
                text.push_str(&format!("{}: {}\n", term, definition));
            } else {
                text.push_str(&format!("{}{}{}\n", term, term_definition_delimiter, definition));
            }
        }
        text
    }

    /// Pairs that are still missing a term or a definition
    pub fn incomplete(&self) -> impl Iterator<Item = &(String, String)> {
        self.pairs
            .iter()
            .filter(|(term, definition)| term.is_empty() || definition.is_empty())
    }
}

/// Staging area for bulk imports
///
/// Delimiters and mass tags act as settings: they survive
/// [`ImportList::import_and_clear`], while the raw text and staged entries do not.
#[derive(Debug, Clone)]
pub struct ImportList {
    /// Pasted text awaiting parsing or validation
    pub raw_text: String,
    /// Regular expression separating entries in `raw_text`
    pub entry_delimiter: String,
    /// Literal separating a term from its definition
    pub term_definition_delimiter: String,
    /// Tags given to every imported entry
    pub mass_tags: String,
    staged: Vec<Entry>,
}

impl Default for ImportList {
    fn default() -> Self {
        Self {
            raw_text: String::new(),
            entry_delimiter: EntryDelimiter::default().pattern().to_string(),
            term_definition_delimiter: TermDefinitionDelimiter::default().as_str().to_string(),
            mass_tags: String::new(),
            staged: Vec::new(),
        }
    }
}

impl ImportList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use preset delimiters
    pub fn set_delimiters(&mut self, entry: EntryDelimiter, term_definition: TermDefinitionDelimiter) {
        self.entry_delimiter = entry.pattern().to_string();
        self.term_definition_delimiter = term_definition.as_str().to_string();
    }

    /// Entries staged for the next commit
    pub fn staged(&self) -> &[Entry] {
        &self.staged
    }

    /// Split `raw_text` into `(term, definition)` pairs
    ///
    /// A chunk without the term/definition delimiter is a bare term. Missing
    /// definitions are asked from `lookup`; when it finds nothing the
    /// definition stays empty and the outcome is marked unsuccessful, but the
    /// pair is still returned.
    pub fn parse_text(&self, lookup: &dyn DefinitionLookup) -> Result<ParseOutcome> {
        let splitter = Regex::new(&self.entry_delimiter)?;
        let mut pairs = Vec::new();
        let mut success = true;

        for chunk in splitter.split(self.raw_text.trim()) {
            let chunk = chunk.trim();
            let split = if self.term_definition_delimiter.is_empty() {
                None
            } else {
                chunk.split_once(self.term_definition_delimiter.as_str())
            };
            let (term, definition) = match split {
                Some((term, definition)) => (term.trim(), definition.trim()),
                None => (chunk, ""),
            };

            let definition = if definition.is_empty() {
                find_definition(lookup, term).unwrap_or_default()
            } else {
                definition.to_string()
            };

            if term.is_empty() || definition.is_empty() {
                success = false;
            }
            pairs.push((term.to_string(), definition));
        }

        log::debug!("Parsed {} pairs, success {}", pairs.len(), success);
        Ok(ParseOutcome { success, pairs })
    }

    /// Strictly check `raw_text` and stage its entries
    ///
    /// Every non-empty line must be `term: definition` with both halves
    /// non-blank; the chosen delimiters are ignored. One bad line rejects the
    /// whole batch and leaves nothing staged.
    pub fn validate_entries(&mut self) -> bool {
        self.staged.clear();
        let mass_tags = self.mass_tags.trim();

        for line in self.raw_text.trim().split('\n').filter(|line| !line.is_empty()) {
            let Some((term, definition)) = line.trim().split_once(':') else {
                self.staged.clear();
                return false;
            };
            let (term, definition) = (term.trim(), definition.trim());
            if term.is_empty() || definition.is_empty() {
                self.staged.clear();
                return false;
            }
            self.staged.push(Entry::new(term, definition, mass_tags));
        }

        true
    }

    /// Stage every row of another Lexes database
    ///
    /// Mass tags are put in front of each row's own tags. Source uids and
    /// timestamps are not carried over. Call [`db::check_foreign_database`]
    /// first; this method assumes a readable table.
    pub fn import_db(&mut self, source: &Path) -> Result<usize> {
        let rows = db::read_foreign_rows(source)?;
        let mass_tags = self.mass_tags.trim();

        for (term, definition, tags) in &rows {
            let combined = format!("{} {}", mass_tags, tags.trim());
            self.staged.push(Entry::new(
                term.as_str(),
                definition.as_str(),
                combined.trim(),
            ));
        }

        log::debug!("Staged {} entries from {:?}", rows.len(), source);
        Ok(rows.len())
    }

    /// Store every staged entry, then clear raw text and staging
    ///
    /// Each entry is stamped with the insert time. `progress` receives
    /// `(inserted, total)` after every row. Returns the number of entries
    /// that were staged.
    pub fn import_and_clear(
        &mut self,
        handle: &LexesHandle,
        progress: impl Fn(u64, u64),
    ) -> Result<usize> {
        let count = self.staged.len();
        let total = count as u64;
        let conn = db::open(handle)?;

        for (index, entry) in self.staged.iter_mut().enumerate() {
            entry.created_at = timestamp_now();
            db::insert_entry(&conn, &handle.limits.clamp(entry))?;
            progress(index as u64 + 1, total);
        }

        self.raw_text.clear();
        self.staged.clear();

        log::info!("Imported {} entries", count);
        Ok(count)
    }
}
