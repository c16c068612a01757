//! Data models for dictionary entries
//!
//! This module defines the entry record stored in the database and the small
//! value types that parameterize a display list: the tag filter and the sort
//! attribute.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::lookup::{self, DefinitionLookup};
use crate::selection::SelectedList;
use crate::{Error, LexesHandle, Result};

/// Timestamp format of `created_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single dictionary entry
///
/// `uid` is `None` until the entry has been stored; the database assigns it
/// on insert and it never changes afterwards. `created_at` is stamped once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Database identifier, increasing in creation order
    pub uid: Option<i64>,
    /// The term being defined
    pub term: String,
    /// Definition text
    pub definition: String,
    /// Whitespace-separated tags, possibly empty
    pub tags: String,
    /// Creation time formatted as `YYYY-MM-DD HH:MM:SS`
    pub created_at: String,
}

/// Current local time in the stored timestamp format
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Split a tag string into its non-empty tokens
pub fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split_whitespace()
}

impl Entry {
    /// Create an unsaved entry stamped with the current time
    pub fn new(
        term: impl Into<String>,
        definition: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            uid: None,
            term: term.into(),
            definition: definition.into(),
            tags: tags.into(),
            created_at: timestamp_now(),
        }
    }

    /// Whether the tag string holds no tags at all
    pub fn is_untagged(&self) -> bool {
        self.tags.trim().is_empty()
    }

    /// Tags of this entry, lowercased, in order of appearance
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(&self.tags).map(str::to_lowercase).collect()
    }

    /// Store this entry and record the uid assigned by the database
    pub fn add(&mut self, handle: &LexesHandle) -> Result<i64> {
        *self = handle.limits.clamp(self);
        let conn = db::open(handle)?;
        let uid = db::insert_entry(&conn, self)?;
        self.uid = Some(uid);
        Ok(uid)
    }

    /// Replace term, definition and tags, and update the stored row
    ///
    /// Returns `false` when no row with this uid exists any more.
    pub fn edit(
        &mut self,
        handle: &LexesHandle,
        term: &str,
        definition: &str,
        tags: &str,
    ) -> Result<bool> {
        let uid = self.uid.ok_or(Error::NotPersisted)?;
        self.term = term.to_string();
        self.definition = definition.to_string();
        self.tags = tags.trim().to_string();
        *self = handle.limits.clamp(self);

        let conn = db::open(handle)?;
        db::update_entry(&conn, uid, &self.term, &self.definition, &self.tags)
    }

    /// Delete the stored row; the value itself stays usable
    pub fn delete(&self, handle: &LexesHandle) -> Result<bool> {
        let uid = self.uid.ok_or(Error::NotPersisted)?;
        let conn = db::open(handle)?;
        db::delete_entry(&conn, uid)
    }

    /// Ask `lookup` for a definition of this term
    ///
    /// A miss yields an empty string so the caller can prompt instead.
    pub fn auto_generate(&self, lookup: &dyn DefinitionLookup) -> String {
        lookup::find_definition(lookup, self.term.trim()).unwrap_or_default()
    }

    /// Add this entry to `selected` unless it is already there
    pub fn select(&self, selected: &mut SelectedList) {
        selected.select(self.clone());
    }

    /// Remove this entry from `selected` if present
    pub fn unselect(&self, selected: &mut SelectedList) {
        selected.unselect(self);
    }
}

/// Ordering applied to a display list or export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortAttribute {
    /// A to Z by term, ignoring case
    AlphabeticalAscending,
    /// Z to A by term, ignoring case
    AlphabeticalDescending,
    /// Oldest first
    DateAscending,
    /// Newest first
    #[default]
    DateDescending,
}

impl SortAttribute {
    pub const ALL: [SortAttribute; 4] = [
        SortAttribute::AlphabeticalAscending,
        SortAttribute::AlphabeticalDescending,
        SortAttribute::DateAscending,
        SortAttribute::DateDescending,
    ];

    /// Name used in settings and on the command line
    pub fn name(self) -> &'static str {
        match self {
            SortAttribute::AlphabeticalAscending => "alphabeticalAscending",
            SortAttribute::AlphabeticalDescending => "alphabeticalDescending",
            SortAttribute::DateAscending => "dateAscending",
            SortAttribute::DateDescending => "dateDescending",
        }
    }

    /// Whether `entry` belongs strictly before `pivot` under this ordering
    pub fn precedes(self, entry: &Entry, pivot: &Entry) -> bool {
        self.compare(entry, pivot) == Ordering::Less
    }

    /// Total order of two entries under this attribute
    ///
    /// Dates compare `(created_at, uid)` so that rows sharing a timestamp
    /// still order by creation.
    pub fn compare(self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            SortAttribute::AlphabeticalAscending => {
                a.term.to_lowercase().cmp(&b.term.to_lowercase())
            }
            SortAttribute::AlphabeticalDescending => {
                b.term.to_lowercase().cmp(&a.term.to_lowercase())
            }
            SortAttribute::DateAscending => date_key(a).cmp(&date_key(b)),
            SortAttribute::DateDescending => date_key(b).cmp(&date_key(a)),
        }
    }
}

fn date_key(entry: &Entry) -> (&str, Option<i64>) {
    (entry.created_at.as_str(), entry.uid)
}

impl fmt::Display for SortAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortAttribute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SortAttribute::ALL
            .into_iter()
            .find(|attr| attr.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown sort attribute '{}', expected one of: {}",
                    s,
                    SortAttribute::ALL.map(SortAttribute::name).join(", ")
                )
            })
    }
}

/// Tag criterion of a display list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagFilter {
    /// Whitespace-separated wanted tags; an empty string disables filtering
    Tags(String),
    /// Only entries that carry no tags
    Untagged,
}

impl Default for TagFilter {
    fn default() -> Self {
        TagFilter::Tags(String::new())
    }
}

impl TagFilter {
    /// Wanted tags, lowercased, with empty tokens dropped
    pub fn wanted(&self) -> Vec<String> {
        match self {
            TagFilter::Tags(tags) => split_tags(tags).map(str::to_lowercase).collect(),
            TagFilter::Untagged => Vec::new(),
        }
    }

    /// Whether this filter lets every entry through
    pub fn is_open(&self) -> bool {
        matches!(self, TagFilter::Tags(tags) if tags.trim().is_empty())
    }
}
