use serde::{Deserialize, Serialize};

/// One term occurrence belonging to a document.
///
/// `wdf` is the within-document frequency: how many times the term occurs
/// in the document. `positions` lists the word positions at which it
/// occurs, ascending; backends that do not store positional data leave it
/// empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub wdf: u32,
    pub positions: Vec<u32>,
}

impl TermEntry {
    pub fn new(term: impl Into<String>, wdf: u32) -> Self {
        Self {
            term: term.into(),
            wdf,
            positions: Vec::new(),
        }
    }

    pub fn with_positions(term: impl Into<String>, wdf: u32, positions: Vec<u32>) -> Self {
        Self {
            term: term.into(),
            wdf,
            positions,
        }
    }
}
