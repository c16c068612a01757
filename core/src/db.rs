//! SQLite database operations
//!
//! This module handles all database interactions including:
//! - Database initialization and schema creation
//! - Entry inserts, updates, deletes and queries
//! - Inspecting and reading another Lexes database for import
//! - Writing export databases
//!
//! There is no long-lived connection: callers open one per operation with
//! [`open`] and drop it when the operation is done.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::models::Entry;
use crate::{Config, Error, ForeignDbError, LexesHandle, Result};

/// Name of the entries table, in this store and in import/export files
pub const TABLE: &str = "master";

/// SQL schema for the dictionary database
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS master (
    uid INTEGER PRIMARY KEY AUTOINCREMENT,
    term TEXT NOT NULL,
    definition TEXT NOT NULL,
    tags TEXT,
    createdAt TEXT NOT NULL
);
"#;

/// Schema of an export file: no timestamps, uids are regenerated on import
const EXPORT_SCHEMA: &str = r#"
DROP TABLE IF EXISTS master;
CREATE TABLE master (
    uid INTEGER PRIMARY KEY AUTOINCREMENT,
    term TEXT NOT NULL,
    definition TEXT NOT NULL,
    tags TEXT
);
"#;

/// Columns an importable database must provide
const REQUIRED_COLUMNS: [&str; 3] = ["term", "definition", "tags"];

/// Initialize the dictionary database
///
/// Opens the database at the configured path, creating the file and its
/// parent directory if necessary, and ensures the schema is set up.
pub fn init_database(config: &Config) -> Result<LexesHandle> {
    let path = &config.db_path;
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidPath(String::new()));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )?;
    conn.execute_batch(SCHEMA)?;
    log::debug!("Opened dictionary at {:?}", path);

    Ok(LexesHandle {
        db_path: path.clone(),
        limits: config.limits,
    })
}

/// Open a fresh connection to the handle's database
pub fn open(handle: &LexesHandle) -> Result<Connection> {
    let conn = Connection::open_with_flags(&handle.db_path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
    Ok(conn)
}

/// Open another database for reading only
fn open_readonly(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(Error::InvalidPath(path.display().to_string()));
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    Ok(conn)
}

/// Convert a `master` row to an Entry
fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
    let tags: Option<String> = row.get("tags")?;
    Ok(Entry {
        uid: Some(row.get("uid")?),
        term: row.get("term")?,
        definition: row.get("definition")?,
        tags: tags.unwrap_or_default(),
        created_at: row.get("createdAt")?,
    })
}

// ============================================================================
// Entry Operations
// ============================================================================

/// Insert an entry and return its uid
///
/// The entry's own `uid` is ignored; the database assigns a new one.
pub fn insert_entry(conn: &Connection, entry: &Entry) -> Result<i64> {
    conn.execute(
        "INSERT INTO master (term, definition, tags, createdAt) VALUES (?, ?, ?, ?)",
        params![entry.term, entry.definition, entry.tags.trim(), entry.created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update term, definition and tags of an entry
pub fn update_entry(
    conn: &Connection,
    uid: i64,
    term: &str,
    definition: &str,
    tags: &str,
) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE master SET term = ?, definition = ?, tags = ? WHERE uid = ?",
        params![term, definition, tags.trim(), uid],
    )?;
    Ok(rows > 0)
}

/// Delete an entry
pub fn delete_entry(conn: &Connection, uid: i64) -> Result<bool> {
    let rows = conn.execute("DELETE FROM master WHERE uid = ?", params![uid])?;
    Ok(rows > 0)
}

/// Delete several entries, one statement per uid, and return how many rows went
///
/// No transaction wraps the batch: rows deleted before a failure stay deleted.
pub fn delete_entries(conn: &Connection, uids: &[i64]) -> Result<usize> {
    let mut stmt = conn.prepare("DELETE FROM master WHERE uid = ?")?;
    let mut deleted = 0;
    for uid in uids {
        deleted += stmt.execute(params![uid])?;
    }
    Ok(deleted)
}

/// Delete every entry and restart uid numbering
pub fn reset_database(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM master", [])?;
    conn.execute("DELETE FROM sqlite_sequence WHERE name = ?", params![TABLE])?;
    log::info!("Reset dictionary, removed {} entries", deleted);
    Ok(deleted)
}

// ============================================================================
// Query Operations
// ============================================================================

/// Get an entry by uid
pub fn get_entry(conn: &Connection, uid: i64) -> Result<Option<Entry>> {
    let entry = conn
        .query_row(
            "SELECT uid, term, definition, tags, createdAt FROM master WHERE uid = ?",
            params![uid],
            row_to_entry,
        )
        .optional()?;
    Ok(entry)
}

/// Get every stored entry in uid order
pub fn get_all_entries(conn: &Connection) -> Result<Vec<Entry>> {
    let mut stmt =
        conn.prepare("SELECT uid, term, definition, tags, createdAt FROM master ORDER BY uid")?;

    let rows = stmt.query_map([], row_to_entry)?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| e.into())
}

/// Number of stored entries
pub fn entry_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM master", [], |row| row.get(0))?;
    Ok(count)
}

/// Every distinct tag, in order of first appearance by uid
pub fn unique_tags(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT tags FROM master ORDER BY uid")?;
    let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

    let mut seen = HashSet::new();
    let mut ordered: Vec<String> = Vec::new();
    for tags in rows {
        let tags = tags?.unwrap_or_default();
        for tag in tags.split_whitespace() {
            if seen.insert(tag.to_string()) {
                ordered.push(tag.to_string());
            }
        }
    }
    Ok(ordered)
}

// ============================================================================
// Import / Export Files
// ============================================================================

/// Check that `path` is a database ImportList can read
///
/// The `master` table must exist, provide `term`, `definition` and `tags`
/// columns, and hold at least one row.
pub fn check_foreign_database(path: &Path) -> Result<()> {
    let conn = open_readonly(path)?;

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        params![TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(ForeignDbError::MissingTable.into());
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?)")?;
    let columns = stmt
        .query_map(params![TABLE], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ForeignDbError::MissingColumns(missing).into());
    }

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM master", [], |row| row.get(0))?;
    if count == 0 {
        return Err(ForeignDbError::Empty.into());
    }
    Ok(())
}

/// Read `(term, definition, tags)` from another Lexes database
pub fn read_foreign_rows(path: &Path) -> Result<Vec<(String, String, String)>> {
    let conn = open_readonly(path)?;
    // rowid equals uid when uid is the integer primary key, and needs no uid column
    let mut stmt = conn.prepare("SELECT term, definition, tags FROM master ORDER BY rowid")?;

    let rows = stmt.query_map([], |row| {
        let tags: Option<String> = row.get(2)?;
        Ok((row.get(0)?, row.get(1)?, tags.unwrap_or_default()))
    })?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| e.into())
}

/// Create (or recreate) an export database holding `rows`
pub fn write_export_database(path: &Path, rows: &[(String, String, String)]) -> Result<()> {
    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;
    tx.execute_batch(EXPORT_SCHEMA)?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO master (term, definition, tags) VALUES (?, ?, ?)")?;
        for (term, definition, tags) in rows {
            stmt.execute(params![term, definition, tags])?;
        }
    }
    tx.commit()?;
    Ok(())
}
