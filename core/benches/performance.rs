//! Performance benchmarks for lexes-core
//!
//! Run with: `cargo bench -p lexes-core`
//!
//! Every view rebuild reads the whole table, so `build` cost grows with the
//! store. These benches track that cost and the sort on its own.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lexes_core::sort::quick_sort;
use lexes_core::{
    db, init, Config, DisplayList, Entry, ImportList, LexesHandle, NoLookup, SortAttribute,
    TagFilter,
};
use std::time::Duration;

// ============================================================================
// Test Data Setup
// ============================================================================

/// Sample cards for realistic vocabulary data
const SAMPLE_ENTRIES: &[(&str, &str, &str)] = &[
    ("atom", "Smallest unit of ordinary matter", "physics science"),
    ("ecosystem", "Community of interacting organisms", "biology science"),
    ("sonnet", "Fourteen-line poem in iambic pentameter", "literature"),
    ("quark", "Elementary particle and constituent of matter", "physics"),
    ("photosynthesis", "Conversion of light into chemical energy", "biology"),
    ("metaphor", "Figure of speech describing by comparison", "literature"),
    ("entropy", "Measure of disorder in a system", "physics chemistry"),
    ("enzyme", "Protein that catalyses a reaction", "biology chemistry"),
    ("haiku", "Japanese poem of seventeen syllables", ""),
    ("isotope", "Variant of an element by neutron count", "chemistry"),
];

fn sample_entry(i: usize) -> Entry {
    let (term, definition, tags) = SAMPLE_ENTRIES[i % SAMPLE_ENTRIES.len()];
    let suffix = i / SAMPLE_ENTRIES.len();
    Entry {
        uid: Some(i as i64 + 1),
        term: format!("{}_{}", term, suffix),
        definition: definition.to_string(),
        tags: tags.to_string(),
        // Spread over days so date sorts see distinct keys
        created_at: format!("2025-{:02}-{:02} 10:00:00", 1 + (i * 7) % 12, 1 + (i * 13) % 28),
    }
}

/// Create a test database holding `entry_count` cards
fn create_test_db(entry_count: usize) -> (tempfile::TempDir, LexesHandle) {
    let dir = tempfile::tempdir().unwrap();
    let handle = init(&Config::new(dir.path().join("bench.db"))).unwrap();

    let conn = db::open(&handle).unwrap();
    conn.execute_batch("BEGIN").unwrap();
    for i in 0..entry_count {
        db::insert_entry(&conn, &sample_entry(i)).unwrap();
    }
    conn.execute_batch("COMMIT").unwrap();

    (dir, handle)
}

// ============================================================================
// View Build Benchmarks
// ============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.measurement_time(Duration::from_secs(10));

    for (name, entry_count) in [("small_100", 100), ("medium_1k", 1000)] {
        let (_dir, handle) = create_test_db(entry_count);

        group.bench_with_input(BenchmarkId::new("open", name), &handle, |b, handle| {
            let mut view = DisplayList::new();
            view.sort_attribute = SortAttribute::AlphabeticalAscending;
            b.iter(|| {
                view.build(black_box(handle)).unwrap();
                black_box(view.entries.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("filtered", name), &handle, |b, handle| {
            let mut view = DisplayList::new();
            view.filter_tags = TagFilter::Tags("physics chemistry".to_string());
            view.require_all_tags = true;
            view.search_keyword = "matter".to_string();
            view.sort_attribute = SortAttribute::AlphabeticalDescending;
            b.iter(|| {
                view.build(black_box(handle)).unwrap();
                black_box(view.entries.len());
            });
        });
    }

    group.finish();
}

// ============================================================================
// Sort Benchmarks
// ============================================================================

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    group.measurement_time(Duration::from_secs(10));

    for count in [100usize, 1000] {
        let entries: Vec<Entry> = (0..count).map(sample_entry).collect();
        group.throughput(Throughput::Elements(count as u64));

        for attribute in SortAttribute::ALL {
            group.bench_with_input(
                BenchmarkId::new(attribute.name(), count),
                &entries,
                |b, entries| {
                    b.iter(|| black_box(quick_sort(entries.clone(), attribute)));
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Import Throughput Benchmarks
// ============================================================================

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");
    group.measurement_time(Duration::from_secs(20));
    group.sample_size(10); // Fewer samples due to longer runtime

    for count in [100usize, 500] {
        group.throughput(Throughput::Elements(count as u64));

        let text: String = (0..count)
            .map(|i| {
                let entry = sample_entry(i);
                format!("{}: {}\n", entry.term, entry.definition)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("parse_text", format!("{}_entries", count)),
            &text,
            |b, text| {
                let mut list = ImportList::new();
                list.raw_text = text.clone();
                b.iter(|| black_box(list.parse_text(&NoLookup).unwrap()));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("validate_and_commit", format!("{}_entries", count)),
            &text,
            |b, text| {
                b.iter_with_setup(
                    || create_test_db(0),
                    |(_dir, handle)| {
                        let mut list = ImportList::new();
                        list.raw_text = text.clone();
                        assert!(list.validate_entries());
                        list.import_and_clear(&handle, |_, _| {}).unwrap();
                    },
                );
            },
        );
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_build, bench_sort, bench_import);

criterion_main!(benches);
