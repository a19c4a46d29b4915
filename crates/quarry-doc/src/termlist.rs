use std::fmt;

use quarry_types::TermEntry;

use crate::error::BackendResult;

/// Forward-only sequence of a document's term occurrences.
///
/// A term list is finite, not restartable, and owned entirely by whoever
/// requested it: consuming one list never moves the position of another
/// opened from the same document. Backends that stream entries off disk or
/// the network can surface a retrieval failure mid-sequence, so each item
/// is a `BackendResult`.
pub struct TermList {
    source: Box<dyn Iterator<Item = BackendResult<TermEntry>> + Send>,
}

impl TermList {
    /// Wrap a backend-specific entry source.
    pub fn new<I>(source: I) -> Self
    where
        I: Iterator<Item = BackendResult<TermEntry>> + Send + 'static,
    {
        Self {
            source: Box::new(source),
        }
    }

    /// A list over already-materialized entries, as produced by in-memory
    /// backends.
    pub fn from_entries(entries: Vec<TermEntry>) -> Self {
        Self::new(entries.into_iter().map(Ok))
    }

    /// The empty term list.
    pub fn empty() -> Self {
        Self::from_entries(Vec::new())
    }
}

impl Iterator for TermList {
    type Item = BackendResult<TermEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next()
    }
}

impl fmt::Debug for TermList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermList").finish_non_exhaustive()
    }
}
