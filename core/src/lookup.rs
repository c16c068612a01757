//! Definition lookup seam
//!
//! Bulk parsing and auto-define ask an external service for a definition of a
//! bare term. The service is opaque here: it either returns text or nothing,
//! and "nothing" is never an error.

/// Source of definitions for terms typed without one
pub trait DefinitionLookup {
    /// Definition of `term`, or `None` when the service knows nothing
    fn lookup(&self, term: &str) -> Option<String>;
}

/// Lookup that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl DefinitionLookup for NoLookup {
    fn lookup(&self, _term: &str) -> Option<String> {
        None
    }
}

impl<F> DefinitionLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, term: &str) -> Option<String> {
        self(term)
    }
}

/// Query a lookup, treating blank answers as misses
pub(crate) fn find_definition(lookup: &dyn DefinitionLookup, term: &str) -> Option<String> {
    if term.is_empty() {
        return None;
    }
    match lookup.lookup(term) {
        Some(definition) if !definition.trim().is_empty() => Some(definition.trim().to_string()),
        _ => {
            log::warn!("No definition found for {:?}", term);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lookup() {
        assert_eq!(NoLookup.lookup("anything"), None);
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |term: &str| (term == "cat").then(|| "A small feline".to_string());
        assert_eq!(find_definition(&lookup, "cat").as_deref(), Some("A small feline"));
        assert_eq!(find_definition(&lookup, "dog"), None);
        assert_eq!(find_definition(&lookup, ""), None);
    }

    #[test]
    fn test_blank_answer_is_a_miss() {
        let lookup = |_: &str| Some("   ".to_string());
        assert_eq!(find_definition(&lookup, "cat"), None);
    }
}
