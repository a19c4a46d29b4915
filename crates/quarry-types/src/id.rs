use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a document within one database.
///
/// Assigned by the owning database when the document is stored and immutable
/// for the life of any handle bound to it. Ids are only meaningful relative
/// to the database that assigned them; two databases may both hold a
/// document 7 with entirely unrelated content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(u32);

impl DocId {
    /// The first id a database assigns. Id 0 is never handed out.
    pub const FIRST: DocId = DocId(1);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The id following this one in assignment order.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocId({})", self.0)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DocId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<DocId> for u32 {
    fn from(id: DocId) -> Self {
        id.0
    }
}

/// Slot number of a fast-access key on a document.
///
/// A document holds at most one value per `KeyId`. Any `u32` is a valid slot
/// number; no ordering semantics are attached beyond what callers impose.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(u32);

impl KeyId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw slot number.
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for KeyId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<KeyId> for u32 {
    fn from(id: KeyId) -> Self {
        id.0
    }
}
