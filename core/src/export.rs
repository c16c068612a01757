//! Export writers
//!
//! Two formats are produced from a list of entries:
//! - delimited text, one `term;definition;tags` record per line, which flashcard
//!   tools such as Anki import directly
//! - a Lexes database holding only term, definition and tags, meant to be
//!   imported again elsewhere (uids and timestamps are regenerated then)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::db;
use crate::models::Entry;
use crate::Result;

/// Field separator of the delimited format
pub const FIELD_DELIMITER: char = ';';

/// Quote a field for the delimited format
///
/// Semicolons inside a field become commas so the record keeps three
/// columns. Fields holding quotes or line breaks are wrapped in quotes, with
/// inner quotes doubled.
pub fn escape_field(field: &str) -> String {
    let field = field.replace(FIELD_DELIMITER, ",");
    if field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// Format one entry as a delimited record, without the line break
pub fn format_record(entry: &Entry, include_tags: bool) -> String {
    let tags = if include_tags { entry.tags.trim() } else { "" };
    format!(
        "{}{sep}{}{sep}{}",
        escape_field(&entry.term),
        escape_field(&entry.definition),
        escape_field(tags),
        sep = FIELD_DELIMITER
    )
}

/// Write `entries` in order to a delimited text file and return the count
pub fn write_delimited(path: &Path, entries: &[Entry], include_tags: bool) -> Result<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    for entry in entries {
        writeln!(writer, "{}", format_record(entry, include_tags))?;
    }
    writer.flush()?;

    log::info!("Exported {} entries to {:?}", entries.len(), path);
    Ok(entries.len())
}

/// Write `entries` in order to a fresh export database and return the count
pub fn write_database(path: &Path, entries: &[Entry], include_tags: bool) -> Result<usize> {
    let rows: Vec<(String, String, String)> = entries
        .iter()
        .map(|entry| {
            let tags = if include_tags {
                entry.tags.trim().to_string()
            } else {
                String::new()
            };
            (entry.term.clone(), entry.definition.clone(), tags)
        })
        .collect();
    db::write_export_database(path, &rows)?;

    log::info!("Exported {} entries to database {:?}", rows.len(), path);
    Ok(rows.len())
}
