//! Explicit configuration for a Lexes store
//!
//! The database location and field caps travel in a [`Config`] value that is
//! handed to [`crate::init`], instead of living in process-wide constants.

use std::env;
use std::path::PathBuf;

use crate::models::Entry;

/// Default location of the dictionary database
pub const DEFAULT_DB_PATH: &str = "database/lexes.db";

/// Environment variable overriding the database path
pub const ENV_DB_PATH: &str = "LEXES_DB_PATH";
const ENV_MAX_TERM: &str = "LEXES_MAX_TERM_LEN";
const ENV_MAX_DEFINITION: &str = "LEXES_MAX_DEFINITION_LEN";
const ENV_MAX_TAGS: &str = "LEXES_MAX_TAGS_LEN";

/// Configuration for opening a Lexes store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Length caps applied to stored fields
    pub limits: FieldLimits,
}

/// Maximum lengths, in characters, of the stored text fields
///
/// Longer values are truncated (with a warning), never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub term: usize,
    pub definition: usize,
    pub tags: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            term: 500,
            definition: 5000,
            tags: 1000,
        }
    }
}

impl FieldLimits {
    /// Copy of `entry` with every field cut to its cap
    pub fn clamp(&self, entry: &Entry) -> Entry {
        Entry {
            uid: entry.uid,
            term: truncate_field("term", &entry.term, self.term),
            definition: truncate_field("definition", &entry.definition, self.definition),
            tags: truncate_field("tags", entry.tags.trim(), self.tags),
            created_at: entry.created_at.clone(),
        }
    }
}

/// Cut `value` to at most `max` characters, on a character boundary
fn truncate_field(name: &str, value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((cut, _)) => {
            log::warn!(
                "Truncating {} from {} to {} characters",
                name,
                value.chars().count(),
                max
            );
            value[..cut].to_string()
        }
        None => value.to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            limits: FieldLimits::default(),
        }
    }
}

impl Config {
    /// Create a configuration for the database at `db_path` with default limits
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            limits: FieldLimits::default(),
        }
    }

    /// Build a configuration from `LEXES_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = FieldLimits::default();
        let db_path = env::var_os(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        Self {
            db_path,
            limits: FieldLimits {
                term: limit_from_env(ENV_MAX_TERM, defaults.term),
                definition: limit_from_env(ENV_MAX_DEFINITION, defaults.definition),
                tags: limit_from_env(ENV_MAX_TAGS, defaults.tags),
            },
        }
    }
}

fn limit_from_env(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(value) => parse_limit(key, &value, default),
        Err(_) => default,
    }
}

fn parse_limit(key: &str, value: &str, default: usize) -> usize {
    match value.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => {
            log::warn!("Ignoring {}={:?}, using {}", key, value, default);
            default
        }
    }
}
