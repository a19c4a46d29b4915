use quarry_types::{DocId, DocumentData, KeyId, KeyMap, KeyValue};

use crate::document::Document;
use crate::error::BackendResult;
use crate::termlist::TermList;

/// Per-document retrieval adapter, one implementation per storage kind.
///
/// A reader is bound to a single document at construction and performs the
/// actual materialization of that document's keys, payload, and term list.
/// The [`Document`] handle dispatches every call here and is oblivious to
/// which backend it talks to.
///
/// All implementations must satisfy these invariants:
/// - An absent key is an empty [`KeyValue`], never an error.
/// - `fetch_all_keys` returns at most one value per `KeyId`, and each value
///   matches what `fetch_key` returns for that slot.
/// - Calls are read-only: concurrent calls through clones of one handle
///   must each observe a self-consistent snapshot of the document.
/// - Blocking I/O must not hold any lock that other readers' calls or
///   handle reference bookkeeping would contend on.
/// - Backend resources held by the reader (open files, sockets) are
///   released when the reader is dropped, which happens exactly once, when
///   the last handle clone goes away.
pub trait DocumentReader: Send + Sync {
    /// Fetch one key by slot number.
    ///
    /// Returns the empty value if the document holds nothing in that slot.
    fn fetch_key(&self, keyid: KeyId) -> BackendResult<KeyValue>;

    /// Fetch every key present on the document.
    fn fetch_all_keys(&self) -> BackendResult<KeyMap>;

    /// Fetch the document's bulk payload.
    ///
    /// May perform arbitrary backend I/O: a disk seek and decode, a network
    /// round-trip for a remote backend.
    fn fetch_data(&self) -> BackendResult<DocumentData>;

    /// Construct a fresh term list over the document's term occurrences.
    ///
    /// Each call produces an independent iterator; consuming one never
    /// affects another.
    fn open_term_list(&self) -> BackendResult<TermList>;
}

/// Factory boundary a database exposes to hand out document handles.
///
/// The database instance must stay alive for as long as any handle it
/// produced; Quarry backends enforce this with weak references, turning a
/// violation into [`BackendError::DatabaseClosed`] instead of stale reads.
///
/// [`BackendError::DatabaseClosed`]: crate::error::BackendError::DatabaseClosed
pub trait Database: Send + Sync {
    /// Open the document with the given id, minting a new shared handle
    /// backed by this database's adapter.
    fn open_document(&self, did: DocId) -> BackendResult<Document>;

    /// Number of documents in the database.
    fn doc_count(&self) -> u64;
}
