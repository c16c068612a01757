//! Filtered, searched and sorted view over the stored entries
//!
//! [`DisplayList::build`] always starts from the full set of stored rows:
//! 1. `filter` keeps rows matching the tag criterion
//! 2. `search` narrows that set to rows containing the keyword
//! 3. `sort` orders what is left
//!
//! The order matters. Search only narrows the filtered set, and sort must see
//! the final candidates.

use crate::db;
use crate::models::{Entry, SortAttribute, TagFilter};
use crate::selection::SelectedList;
use crate::sort::quick_sort;
use crate::{LexesHandle, Result};

/// What a built view has to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// At least one entry matched
    Populated,
    /// Entries exist but none match the filter and keyword
    NoMatches,
    /// The store has no entries at all
    StoreEmpty,
}

/// View builder over the dictionary
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    /// Entries of the last build, in display order
    pub entries: Vec<Entry>,
    /// Tag criterion
    pub filter_tags: TagFilter,
    /// Whether every wanted tag must be present (AND) rather than any (OR)
    pub require_all_tags: bool,
    /// Case-insensitive substring matched against term, definition and tags
    pub search_keyword: String,
    /// Display order
    pub sort_attribute: SortAttribute,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `entries` with every stored row that passes the tag filter
    pub fn filter(&mut self, handle: &LexesHandle) -> Result<()> {
        let conn = db::open(handle)?;
        let rows = db::get_all_entries(&conn)?;
        self.entries = filter_entries(rows, &self.filter_tags, self.require_all_tags);
        Ok(())
    }

    /// Keep only entries containing the search keyword; no-op when it is empty
    pub fn search(&mut self) {
        if self.search_keyword.is_empty() {
            return;
        }
        let keyword = self.search_keyword.to_lowercase();
        self.entries.retain(|entry| {
            entry.term.to_lowercase().contains(&keyword)
                || entry.definition.to_lowercase().contains(&keyword)
                || entry.tags.to_lowercase().contains(&keyword)
        });
    }

    /// Order `entries` by the sort attribute
    pub fn sort(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = quick_sort(entries, self.sort_attribute);
    }

    /// Rebuild the view: filter, then search, then sort
    pub fn build(&mut self, handle: &LexesHandle) -> Result<()> {
        self.filter(handle)?;
        self.search();
        self.sort();
        log::debug!(
            "Built display list: {} entries (filter {:?}, all {}, keyword {:?}, sort {})",
            self.entries.len(),
            self.filter_tags,
            self.require_all_tags,
            self.search_keyword,
            self.sort_attribute
        );
        Ok(())
    }

    /// Add every displayed entry to `selected`
    pub fn select_all(&self, selected: &mut SelectedList) {
        selected.select_many(&self.entries);
    }

    /// Whether every displayed entry is selected (and something is displayed)
    pub fn is_fully_selected(&self, selected: &SelectedList) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|entry| selected.contains(entry))
    }

    /// Tell "nothing matched" apart from "nothing stored"
    pub fn state(&self, handle: &LexesHandle) -> Result<DisplayState> {
        if !self.entries.is_empty() {
            return Ok(DisplayState::Populated);
        }
        let conn = db::open(handle)?;
        if db::entry_count(&conn)? == 0 {
            Ok(DisplayState::StoreEmpty)
        } else {
            Ok(DisplayState::NoMatches)
        }
    }

    /// Drop the tag filter and keyword, keeping the sort order
    pub fn reset_view(&mut self) {
        self.filter_tags = TagFilter::default();
        self.require_all_tags = false;
        self.search_keyword.clear();
    }
}

/// Apply a tag filter to `rows`, keeping their order
pub fn filter_entries(rows: Vec<Entry>, filter: &TagFilter, require_all: bool) -> Vec<Entry> {
    if let TagFilter::Untagged = filter {
        return rows.into_iter().filter(Entry::is_untagged).collect();
    }

    let wanted = filter.wanted();
    if wanted.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|entry| {
            let tags = entry.tag_list();
            if require_all {
                wanted.iter().all(|tag| tags.contains(tag))
            } else {
                wanted.iter().any(|tag| tags.contains(tag))
            }
        })
        .collect()
}
