//! Lexes command-line front end
//!
//! Manages a personal dictionary stored in SQLite: add and edit entries,
//! browse them filtered, searched and sorted, bulk-import pasted text or
//! another Lexes database, and export a view for flashcard tools.
//!
//! # Usage
//!
//! ```bash
//! lexes add mitochondria "Powerhouse of the cell" --tags "biology cells"
//! lexes list --tags "biology physics" --all --sort alphabeticalAscending
//! lexes import-text --input notes.txt --mass-tags revision
//! lexes export cards.txt --tags biology --no-tags
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use lexes_core::{
    db, Config, DisplayList, DisplayState, Entry, EntryDelimiter, ImportList, LexesHandle,
    NoLookup, SelectedList, SortAttribute, TagFilter, TermDefinitionDelimiter,
};

/// Lexes - personal dictionary and flashcard store
#[derive(Parser, Debug)]
#[command(name = "lexes")]
#[command(author, version, about = "Manage a personal term/definition dictionary")]
#[command(long_about = "
Manage a personal term/definition dictionary stored in SQLite.

The database path comes from --db, then LEXES_DB_PATH (a .env file is read
if present), then database/lexes.db.

Example usage:
  lexes add atom \"Smallest unit of matter\" --tags physics
  lexes list --search cell --sort dateAscending
  lexes import-db friend.db --mass-tags shared
")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Quiet mode - suppress progress bars
    #[arg(short, long, global = true, default_value = "false")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a single entry
    Add {
        term: String,
        definition: String,
        /// Whitespace-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },
    /// Change an existing entry
    Edit {
        uid: i64,
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        definition: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete entries by uid
    Delete {
        #[arg(required = true)]
        uids: Vec<i64>,
    },
    /// Show entries
    List {
        #[command(flatten)]
        view: ViewArgs,
        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// Show every tag in use
    Tags,
    /// Show the number of stored entries
    Count,
    /// Preview how pasted text splits into entries
    Parse {
        #[command(flatten)]
        input: TextInput,
        /// Separator between entries: line, semicolon or comma
        #[arg(long, default_value = "line")]
        entry_delimiter: EntryDelimiter,
        /// Separator between term and definition: colon, hyphen or equals
        #[arg(long, default_value = "colon")]
        term_delimiter: TermDefinitionDelimiter,
    },
    /// Import `term: definition` lines
    ImportText {
        #[command(flatten)]
        input: TextInput,
        /// Tags added to every imported entry
        #[arg(long, default_value = "")]
        mass_tags: String,
    },
    /// Import every entry of another Lexes database
    ImportDb {
        source: PathBuf,
        /// Tags added in front of each imported entry's tags
        #[arg(long, default_value = "")]
        mass_tags: String,
    },
    /// Export the entries of a view
    Export {
        output: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, value_enum, default_value_t = ExportFormat::Delimited)]
        format: ExportFormat,
        /// Leave the tags column empty
        #[arg(long, default_value = "false")]
        no_tags: bool,
    },
    /// Delete every entry and restart uid numbering
    Reset {
        /// Confirm the reset
        #[arg(long, default_value = "false")]
        yes: bool,
    },
}

/// Filter, search and sort options shared by list and export
#[derive(Args, Debug)]
struct ViewArgs {
    /// Whitespace-separated tags to filter on
    #[arg(long, default_value = "", conflicts_with = "untagged")]
    tags: String,
    /// Require every tag instead of any
    #[arg(long, default_value = "false")]
    all: bool,
    /// Only entries without tags
    #[arg(long, default_value = "false")]
    untagged: bool,
    /// Case-insensitive keyword
    #[arg(short, long, default_value = "")]
    search: String,
    /// alphabeticalAscending, alphabeticalDescending, dateAscending or dateDescending
    #[arg(long, default_value = "dateDescending")]
    sort: SortAttribute,
}

/// Source of pasted text
#[derive(Args, Debug)]
struct TextInput {
    /// Read text from this file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
    /// `term;definition;tags` lines
    Delimited,
    /// Re-importable Lexes database
    Database,
}

fn main() -> Result<()> {
    // .env may set RUST_LOG, so load it before the logger
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    let handle = lexes_core::init(&config)
        .with_context(|| format!("Failed to open dictionary at {:?}", config.db_path))?;

    match cli.command {
        Command::Add {
            term,
            definition,
            tags,
        } => add(&handle, &term, &definition, &tags),
        Command::Edit {
            uid,
            term,
            definition,
            tags,
        } => edit(&handle, uid, term, definition, tags),
        Command::Delete { uids } => delete(&handle, &uids),
        Command::List { view, json } => list(&handle, &view, json),
        Command::Tags => {
            let conn = db::open(&handle)?;
            for tag in db::unique_tags(&conn)? {
                println!("{}", tag);
            }
            Ok(())
        }
        Command::Count => {
            let conn = db::open(&handle)?;
            println!("{}", db::entry_count(&conn)?);
            Ok(())
        }
        Command::Parse {
            input,
            entry_delimiter,
            term_delimiter,
        } => parse(&input, entry_delimiter, term_delimiter),
        Command::ImportText { input, mass_tags } => {
            import_text(&handle, &input, &mass_tags, cli.quiet)
        }
        Command::ImportDb { source, mass_tags } => {
            import_db(&handle, &source, &mass_tags, cli.quiet)
        }
        Command::Export {
            output,
            view,
            format,
            no_tags,
        } => export(&handle, &output, &view, format, !no_tags),
        Command::Reset { yes } => {
            if !yes {
                anyhow::bail!("Reset deletes every entry. Re-run with --yes to confirm.");
            }
            let conn = db::open(&handle)?;
            let removed = db::reset_database(&conn)?;
            println!("Removed {} entries.", removed);
            Ok(())
        }
    }
}

fn add(handle: &LexesHandle, term: &str, definition: &str, tags: &str) -> Result<()> {
    let (term, definition) = (term.trim(), definition.trim());
    if term.is_empty() || definition.is_empty() {
        anyhow::bail!("Both term and definition are required");
    }

    let mut entry = Entry::new(term, definition, tags.trim());
    let uid = entry.add(handle).context("Failed to add entry")?;
    println!("Added #{} {}", uid, entry.term);
    Ok(())
}

fn edit(
    handle: &LexesHandle,
    uid: i64,
    term: Option<String>,
    definition: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    let conn = db::open(handle)?;
    let mut entry = db::get_entry(&conn, uid)?.with_context(|| format!("No entry #{}", uid))?;
    drop(conn);

    let term = term.unwrap_or_else(|| entry.term.clone());
    let definition = definition.unwrap_or_else(|| entry.definition.clone());
    let tags = tags.unwrap_or_else(|| entry.tags.clone());
    if term.trim().is_empty() || definition.trim().is_empty() {
        anyhow::bail!("Term and definition cannot be empty");
    }

    entry.edit(handle, term.trim(), definition.trim(), &tags)?;
    println!("Updated #{} {}", uid, entry.term);
    Ok(())
}

fn delete(handle: &LexesHandle, uids: &[i64]) -> Result<()> {
    let conn = db::open(handle)?;
    let mut selected = SelectedList::new();
    for uid in uids {
        match db::get_entry(&conn, *uid)? {
            Some(entry) => {
                selected.select(entry);
            }
            None => log::warn!("No entry #{}, skipping", uid),
        }
    }
    drop(conn);

    let deleted = selected.delete_all(handle)?;
    println!("Deleted {} entries.", deleted);
    Ok(())
}

fn build_view(handle: &LexesHandle, args: &ViewArgs) -> Result<DisplayList> {
    let mut view = DisplayList::new();
    view.filter_tags = if args.untagged {
        TagFilter::Untagged
    } else {
        TagFilter::Tags(args.tags.clone())
    };
    view.require_all_tags = args.all;
    view.search_keyword = args.search.clone();
    view.sort_attribute = args.sort;
    view.build(handle).context("Failed to build entry list")?;
    Ok(view)
}

fn list(handle: &LexesHandle, args: &ViewArgs, json: bool) -> Result<()> {
    let view = build_view(handle, args)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view.entries)?);
        return Ok(());
    }

    match view.state(handle)? {
        DisplayState::StoreEmpty => println!("The dictionary is empty. Add or import entries to begin."),
        DisplayState::NoMatches => println!("No entries match the current filter and search."),
        DisplayState::Populated => {
            for entry in &view.entries {
                println!(
                    "#{:<5} {}  {}",
                    entry.uid.unwrap_or_default(),
                    entry.created_at,
                    entry.term
                );
                println!("       {}", entry.definition);
                if !entry.is_untagged() {
                    println!("       [{}]", entry.tags);
                }
            }
            println!();
            println!("{} entries", view.entries.len());
        }
    }
    Ok(())
}

fn read_text(input: &TextInput) -> Result<String> {
    match &input.input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn parse(
    input: &TextInput,
    entry_delimiter: EntryDelimiter,
    term_delimiter: TermDefinitionDelimiter,
) -> Result<()> {
    let mut import_list = ImportList::new();
    import_list.raw_text = read_text(input)?;
    if import_list.raw_text.trim().is_empty() {
        anyhow::bail!("Nothing to parse");
    }
    import_list.set_delimiters(entry_delimiter, term_delimiter);

    let outcome = import_list.parse_text(&NoLookup)?;
    print!("{}", outcome.render(term_delimiter.as_str()));

    if outcome.success {
        log::info!("Successfully parsed {} entries", outcome.pairs.len());
    } else {
        log::warn!(
            "{} of {} entries are missing a term or definition",
            outcome.incomplete().count(),
            outcome.pairs.len()
        );
    }
    Ok(())
}

fn import_text(handle: &LexesHandle, input: &TextInput, mass_tags: &str, quiet: bool) -> Result<()> {
    let mut import_list = ImportList::new();
    import_list.raw_text = read_text(input)?;
    import_list.mass_tags = mass_tags.trim().to_string();
    if import_list.raw_text.trim().is_empty() {
        anyhow::bail!("Nothing to import");
    }

    if !import_list.validate_entries() {
        anyhow::bail!(
            "Some entries are invalid. Every line must read `term: definition`; \
             run `lexes parse` to review the text."
        );
    }
    commit(handle, &mut import_list, quiet)
}

fn import_db(handle: &LexesHandle, source: &Path, mass_tags: &str, quiet: bool) -> Result<()> {
    db::check_foreign_database(source)
        .with_context(|| format!("Cannot import from {:?}", source))?;

    let mut import_list = ImportList::new();
    import_list.mass_tags = mass_tags.trim().to_string();
    import_list.import_db(source)?;
    commit(handle, &mut import_list, quiet)
}

/// Write staged entries with a progress bar and report the count
fn commit(handle: &LexesHandle, import_list: &mut ImportList, quiet: bool) -> Result<()> {
    let start_time = Instant::now();

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(import_list.staged().len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries ({eta})")?
            .progress_chars("#>-"),
    );

    let pb_clone = pb.clone();
    let count = import_list
        .import_and_clear(handle, move |current, _total| pb_clone.set_position(current))
        .context("Import failed")?;
    pb.finish_and_clear();

    println!(
        "Successfully imported {} entries in {}.",
        count,
        HumanDuration(start_time.elapsed())
    );
    Ok(())
}

fn export(
    handle: &LexesHandle,
    output: &Path,
    args: &ViewArgs,
    format: ExportFormat,
    include_tags: bool,
) -> Result<()> {
    let view = build_view(handle, args)?;
    let mut selected = SelectedList::new();
    view.select_all(&mut selected);
    if selected.is_empty() {
        anyhow::bail!("No entries to export");
    }

    let count = match format {
        ExportFormat::Delimited => selected.export_delimited(output, include_tags),
        ExportFormat::Database => selected.export_database(output, include_tags),
    }
    .with_context(|| format!("Failed to export to {:?}", output))?;

    println!("Exported {} entries to {:?}", count, output);
    Ok(())
}
