//! Selection set of displayed entries
//!
//! A [`SelectedList`] is the working set that batch actions run on: deleting
//! every selected entry, or exporting the selection as delimited text or as a
//! database. Selecting is idempotent; an entry is held at most once.
//!
//! Stored entries are identified by `uid`, so re-selecting one after an edit
//! refreshes the held copy instead of adding a second one. Entries that were
//! never stored are compared by value.

use std::fmt;
use std::path::Path;

use crate::db;
use crate::export;
use crate::models::{Entry, SortAttribute};
use crate::sort::quick_sort;
use crate::{LexesHandle, Result};

/// Observer told about every change in selection size
pub trait SelectionListener {
    /// Called after membership changed, with the new number of selected entries
    fn selection_changed(&self, selected: usize);
}

/// The user's current multi-selection
#[derive(Default)]
pub struct SelectedList {
    entries: Vec<Entry>,
    listener: Option<Box<dyn SelectionListener>>,
}

impl fmt::Debug for SelectedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedList")
            .field("entries", &self.entries)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl SelectedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty selection reporting changes to `listener`
    pub fn with_listener(listener: Box<dyn SelectionListener>) -> Self {
        Self {
            entries: Vec::new(),
            listener: Some(listener),
        }
    }

    /// Replace the change listener
    pub fn set_listener(&mut self, listener: Option<Box<dyn SelectionListener>>) {
        self.listener = listener;
    }

    /// Selected entries in selection order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `entry` (or a copy of the same stored row) is selected
    pub fn contains(&self, entry: &Entry) -> bool {
        self.position(entry).is_some()
    }

    /// Add `entry` unless it is already selected
    ///
    /// A held copy of the same stored row is replaced by `entry`. Returns
    /// whether membership changed.
    pub fn select(&mut self, entry: Entry) -> bool {
        let added = self.insert(entry);
        if added {
            self.notify();
        }
        added
    }

    /// Add every entry of `entries` not yet selected, notifying once
    pub fn select_many<'a>(&mut self, entries: impl IntoIterator<Item = &'a Entry>) -> usize {
        let mut added = 0;
        for entry in entries {
            if self.insert(entry.clone()) {
                added += 1;
            }
        }
        if added > 0 {
            self.notify();
        }
        added
    }

    /// Remove `entry` if selected; returns whether the selection changed
    pub fn unselect(&mut self, entry: &Entry) -> bool {
        match self.position(entry) {
            Some(index) => {
                self.entries.remove(index);
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Drop every entry from the selection
    pub fn unselect_all(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.notify();
    }

    /// Delete every selected entry from storage, then empty the selection
    ///
    /// Returns the number of rows actually removed. Entries that were never
    /// stored are skipped.
    pub fn delete_all(&mut self, handle: &LexesHandle) -> Result<usize> {
        let uids: Vec<i64> = self.entries.iter().filter_map(|entry| entry.uid).collect();
        let conn = db::open(handle)?;
        let deleted = db::delete_entries(&conn, &uids)?;
        log::info!("Deleted {} of {} selected entries", deleted, self.entries.len());

        self.unselect_all();
        Ok(deleted)
    }

    /// Export the selection, newest first, as `term;definition;tags` lines
    pub fn export_delimited(&self, path: &Path, include_tags: bool) -> Result<usize> {
        let ordered = quick_sort(self.entries.clone(), SortAttribute::DateDescending);
        export::write_delimited(path, &ordered, include_tags)
    }

    /// Export the selection, oldest first, to a re-importable database
    pub fn export_database(&self, path: &Path, include_tags: bool) -> Result<usize> {
        let ordered = quick_sort(self.entries.clone(), SortAttribute::DateAscending);
        export::write_database(path, &ordered, include_tags)
    }

    fn position(&self, entry: &Entry) -> Option<usize> {
        match entry.uid {
            Some(uid) => self.entries.iter().position(|held| held.uid == Some(uid)),
            None => self
                .entries
                .iter()
                .position(|held| held.uid.is_none() && held == entry),
        }
    }

    /// Push `entry`, or refresh the held copy of the same row
    fn insert(&mut self, entry: Entry) -> bool {
        match self.position(&entry) {
            Some(index) => {
                self.entries[index] = entry;
                false
            }
            None => {
                self.entries.push(entry);
                true
            }
        }
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener.selection_changed(self.entries.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::Config;

    struct Recorder(Rc<RefCell<Vec<usize>>>);

    impl SelectionListener for Recorder {
        fn selection_changed(&self, selected: usize) {
            self.0.borrow_mut().push(selected);
        }
    }

    fn entry(uid: i64, term: &str, created_at: &str) -> Entry {
        Entry {
            uid: Some(uid),
            term: term.to_string(),
            definition: format!("{} definition", term),
            tags: "sample".to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut selected = SelectedList::new();
        let atom = entry(1, "atom", "2025-01-01 00:00:00");

        assert!(selected.select(atom.clone()));
        assert!(!selected.select(atom.clone()));
        atom.select(&mut selected);
        assert_eq!(selected.len(), 1);

        atom.unselect(&mut selected);
        assert!(selected.is_empty());
        assert!(!selected.unselect(&atom));
    }

    #[test]
    fn test_listener_sees_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut selected = SelectedList::with_listener(Box::new(Recorder(seen.clone())));
        let a = entry(1, "a", "2025-01-01 00:00:00");
        let b = entry(2, "b", "2025-01-01 00:00:00");

        selected.select(a.clone());
        selected.select(a.clone());
        selected.select_many([&a, &b]);
        selected.unselect(&a);
        selected.unselect_all();
        selected.unselect_all();

        assert_eq!(*seen.borrow(), vec![1, 2, 1, 0]);
    }

    #[test]
    fn test_stored_entries_match_by_uid() {
        let mut selected = SelectedList::new();
        let stale = entry(1, "cat", "2025-01-01 00:00:00");
        let mut fresh = stale.clone();
        fresh.definition = "small feline".to_string();

        assert!(selected.select(stale.clone()));
        assert!(!selected.select(fresh.clone()));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.entries()[0].definition, "small feline");
        assert!(selected.contains(&stale));

        assert!(selected.unselect(&stale));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_unsaved_entries_match_by_value() {
        let mut selected = SelectedList::new();
        let draft = Entry::new("cat", "feline", "");
        let mut other = draft.clone();
        other.definition = "small feline".to_string();

        assert!(selected.select(draft.clone()));
        assert!(!selected.select(draft));
        assert!(selected.select(other));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_reselect_after_edit_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let handle = crate::init(&Config::new(dir.path().join("t.db"))).unwrap();
        let mut cat = Entry::new("cat", "feline", "");
        cat.add(&handle).unwrap();

        let mut view = crate::DisplayList::new();
        view.build(&handle).unwrap();
        let mut selected = SelectedList::new();
        view.select_all(&mut selected);

        cat.edit(&handle, "cat", "small feline", "").unwrap();
        view.build(&handle).unwrap();
        assert!(view.is_fully_selected(&selected));
        assert_eq!(selected.select_many(&view.entries), 0);
        assert_eq!(selected.len(), 1);

        let path = dir.path().join("cards.txt");
        assert_eq!(selected.export_delimited(&path, false).unwrap(), 1);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "cat;small feline;\n");
    }

    #[test]
    fn test_delete_all() {
        let dir = tempfile::tempdir().unwrap();
        let handle = crate::init(&Config::new(dir.path().join("t.db"))).unwrap();

        let mut a = Entry::new("a", "first", "");
        let mut b = Entry::new("b", "second", "");
        let mut c = Entry::new("c", "third", "");
        a.add(&handle).unwrap();
        b.add(&handle).unwrap();
        c.add(&handle).unwrap();

        let mut selected = SelectedList::new();
        selected.select(a);
        selected.select(c);
        selected.select(Entry::new("unsaved", "never stored", ""));

        assert_eq!(selected.delete_all(&handle).unwrap(), 2);
        assert!(selected.is_empty());

        let conn = db::open(&handle).unwrap();
        let remaining = db::get_all_entries(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].term, "b");
    }

    #[test]
    fn test_export_orders() {
        let dir = tempfile::tempdir().unwrap();
        let mut selected = SelectedList::new();
        selected.select(entry(2, "middle", "2025-01-02 00:00:00"));
        selected.select(entry(1, "oldest", "2025-01-01 00:00:00"));
        selected.select(entry(3, "newest", "2025-01-03 00:00:00"));

        let csv = dir.path().join("cards.txt");
        assert_eq!(selected.export_delimited(&csv, false).unwrap(), 3);
        let lines: Vec<String> = std::fs::read_to_string(&csv)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(
            lines,
            vec![
                "newest;newest definition;",
                "middle;middle definition;",
                "oldest;oldest definition;",
            ]
        );

        let db_path = dir.path().join("cards.db");
        assert_eq!(selected.export_database(&db_path, true).unwrap(), 3);
        let rows = db::read_foreign_rows(&db_path).unwrap();
        let terms: Vec<&str> = rows.iter().map(|(term, _, _)| term.as_str()).collect();
        assert_eq!(terms, vec!["oldest", "middle", "newest"]);
        assert_eq!(rows[0].2, "sample");
    }
}
