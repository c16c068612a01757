//! Partition sort over entries
//!
//! A first-element-pivot quicksort: each pass splits the remaining entries into
//! those that strictly precede the pivot and the rest, and the result is
//! `sorted(lesser) + [pivot] + sorted(greater)`. Entries equal to the pivot go
//! to the `greater` side in their original order, which keeps the sort stable.
//!
//! Pending segments live on an explicit work stack rather than the call stack,
//! so already-ordered input (the common case for date sorts over rows read in
//! uid order) cannot exhaust the thread's stack.

use crate::models::{Entry, SortAttribute};

enum Work {
    Sort(Vec<Entry>),
    Emit(Entry),
}

/// Sort `entries` by `attribute`
pub fn quick_sort(entries: Vec<Entry>, attribute: SortAttribute) -> Vec<Entry> {
    let mut sorted = Vec::with_capacity(entries.len());
    let mut stack = vec![Work::Sort(entries)];

    while let Some(work) = stack.pop() {
        match work {
            Work::Emit(entry) => sorted.push(entry),
            Work::Sort(segment) if segment.len() <= 1 => sorted.extend(segment),
            Work::Sort(segment) => {
                let mut rest = segment.into_iter();
                let Some(pivot) = rest.next() else {
                    continue;
                };
                let (lesser, greater): (Vec<Entry>, Vec<Entry>) =
                    rest.partition(|entry| attribute.precedes(entry, &pivot));

                // Pushed in reverse: lesser is handled first
                stack.push(Work::Sort(greater));
                stack.push(Work::Emit(pivot));
                stack.push(Work::Sort(lesser));
            }
        }
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(uid: i64, term: &str, created_at: &str) -> Entry {
        Entry {
            uid: Some(uid),
            term: term.to_string(),
            definition: format!("{} definition", term),
            tags: String::new(),
            created_at: created_at.to_string(),
        }
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry(1, "mitochondria", "2025-03-01 08:00:00"),
            entry(2, "Atom", "2025-03-02 08:00:00"),
            entry(3, "ecosystem", "2025-03-01 08:00:00"),
            entry(4, "atom", "2025-02-27 12:30:00"),
            entry(5, "Zygote", "2025-03-02 08:00:00"),
            entry(6, "cell", "2025-03-01 08:00:00"),
        ]
    }

    fn uids(entries: &[Entry]) -> Vec<i64> {
        entries.iter().filter_map(|e| e.uid).collect()
    }

    #[test]
    fn test_short_inputs() {
        assert!(quick_sort(Vec::new(), SortAttribute::DateAscending).is_empty());
        let one = vec![entry(1, "solo", "2025-01-01 00:00:00")];
        assert_eq!(quick_sort(one.clone(), SortAttribute::AlphabeticalDescending), one);
    }

    #[test]
    fn test_alphabetical_ascending_is_stable() {
        let sorted = quick_sort(sample(), SortAttribute::AlphabeticalAscending);
        // "Atom" (2) and "atom" (4) compare equal and keep input order
        assert_eq!(uids(&sorted), vec![2, 4, 6, 3, 1, 5]);
    }

    #[test]
    fn test_alphabetical_descending() {
        let sorted = quick_sort(sample(), SortAttribute::AlphabeticalDescending);
        assert_eq!(uids(&sorted), vec![5, 1, 3, 6, 2, 4]);
    }

    #[test]
    fn test_date_orders_break_ties_by_uid() {
        let ascending = quick_sort(sample(), SortAttribute::DateAscending);
        assert_eq!(uids(&ascending), vec![4, 1, 3, 6, 2, 5]);

        let descending = quick_sort(sample(), SortAttribute::DateDescending);
        assert_eq!(uids(&descending), vec![5, 2, 6, 3, 1, 4]);
    }

    #[test]
    fn test_date_orders_are_reverses() {
        let mut ascending = quick_sort(sample(), SortAttribute::DateAscending);
        let descending = quick_sort(sample(), SortAttribute::DateDescending);
        ascending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn test_sort_is_idempotent() {
        for attribute in SortAttribute::ALL {
            let once = quick_sort(sample(), attribute);
            let twice = quick_sort(once.clone(), attribute);
            assert_eq!(once, twice, "{} not idempotent", attribute);
        }
    }

    #[test]
    fn test_matches_stable_key_sort() {
        for attribute in SortAttribute::ALL {
            let mut expected = sample();
            expected.sort_by(|a, b| attribute.compare(a, b));
            assert_eq!(quick_sort(sample(), attribute), expected);
        }
    }

    #[test]
    fn test_presorted_input_does_not_overflow() {
        let entries: Vec<Entry> = (1..=5_000)
            .map(|uid| entry(uid, &format!("term{}", uid), "2025-01-01 00:00:00"))
            .collect();
        let sorted = quick_sort(entries, SortAttribute::DateAscending);
        assert_eq!(sorted.len(), 5_000);
        assert_eq!(sorted[0].uid, Some(1));
        assert_eq!(sorted[4_999].uid, Some(5_000));
    }
}
