//! # lexes-core
//!
//! Core library for Lexes, a personal dictionary and flashcard store.
//!
//! This crate provides:
//! - SQLite storage for term/definition/tags entries
//! - A filtered, searched and sorted view over the stored entries
//! - A selection set with delimited-text and database exports
//! - Bulk import from pasted text or another Lexes database
//!
//! ## Usage
//!
//! ```ignore
//! use lexes_core::{init, Config, DisplayList, SortAttribute, TagFilter};
//!
//! let handle = init(&Config::default())?;
//! let mut view = DisplayList::new();
//! view.filter_tags = TagFilter::Tags("biology".to_string());
//! view.sort_attribute = SortAttribute::AlphabeticalAscending;
//! view.build(&handle)?;
//! for entry in &view.entries {
//!     println!("{}: {}", entry.term, entry.definition);
//! }
//! ```

pub mod config;
pub mod db;
pub mod display;
pub mod export;
pub mod import;
pub mod lookup;
pub mod models;
pub mod selection;
pub mod sort;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use config::{Config, FieldLimits};
pub use display::{DisplayList, DisplayState};
pub use import::{EntryDelimiter, ImportList, ParseOutcome, TermDefinitionDelimiter};
pub use lookup::{DefinitionLookup, NoLookup};
pub use models::{Entry, SortAttribute, TagFilter};
pub use selection::{SelectedList, SelectionListener};

/// Errors that can occur in lexes-core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid entry delimiter: {0}")]
    InvalidDelimiter(#[from] regex::Error),

    #[error("Invalid source database: {0}")]
    ForeignDatabase(#[from] ForeignDbError),

    #[error("Invalid database path: {0}")]
    InvalidPath(String),

    #[error("Entry has not been stored yet")]
    NotPersisted,
}

/// Reasons a database chosen for import cannot be read as a Lexes database
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForeignDbError {
    #[error("no 'master' table found")]
    MissingTable,

    #[error("'master' table is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("'master' table has no entries")]
    Empty,
}

/// Result type alias for lexes-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Handle to an initialized Lexes database
///
/// The handle only carries the database location and field limits. Each
/// storage operation opens its own connection and closes it when done, so
/// a handle can be cloned freely.
#[derive(Debug, Clone)]
pub struct LexesHandle {
    pub(crate) db_path: PathBuf,
    pub(crate) limits: FieldLimits,
}

impl LexesHandle {
    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Field length caps applied on insert and edit
    pub fn limits(&self) -> &FieldLimits {
        &self.limits
    }
}

/// Initialize the dictionary store described by `config`
///
/// Creates the database file (and its parent directory) if needed and
/// ensures the entries table exists.
///
/// # Example
///
/// ```ignore
/// let handle = lexes_core::init(&lexes_core::Config::from_env())?;
/// ```
pub fn init(config: &Config) -> Result<LexesHandle> {
    db::init_database(config)
}
