use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tracing::debug;

use quarry_doc::error::{BackendError, BackendResult};
use quarry_doc::termlist::TermList;
use quarry_doc::traits::{Database, DocumentReader};
use quarry_doc::Document;
use quarry_types::{DocId, DocumentData, KeyId, KeyMap, KeyValue, TermEntry};

/// One document as held in memory.
#[derive(Clone)]
struct StoredDoc {
    keys: KeyMap,
    data: DocumentData,
    terms: Vec<TermEntry>,
}

#[derive(Default)]
struct MemoryState {
    docs: BTreeMap<DocId, StoredDoc>,
}

/// In-memory document database.
///
/// Documents live in a `BTreeMap` behind a `RwLock`; reads through handles
/// take the read lock per call, so concurrent consumers each observe a
/// consistent snapshot. Ids are assigned sequentially from
/// [`DocId::FIRST`].
pub struct MemoryDatabase {
    state: Arc<RwLock<MemoryState>>,
    next_id: AtomicU32,
}

impl MemoryDatabase {
    /// Create a new empty database.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState::default())),
            next_id: AtomicU32::new(DocId::FIRST.get()),
        }
    }

    /// Store a document and return its assigned id.
    ///
    /// This is the bulk-load path of the concrete backend, not part of the
    /// [`Database`] read contract.
    pub fn add_document(
        &self,
        keys: KeyMap,
        data: DocumentData,
        terms: Vec<TermEntry>,
    ) -> DocId {
        let did = DocId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut state = self.state.write().expect("lock poisoned");
        debug!(%did, keys = keys.len(), terms = terms.len(), "document added");
        state.docs.insert(did, StoredDoc { keys, data, terms });
        did
    }

    /// Returns `true` if the database holds no documents.
    pub fn is_empty(&self) -> bool {
        self.state.read().expect("lock poisoned").docs.is_empty()
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for MemoryDatabase {
    fn open_document(&self, did: DocId) -> BackendResult<Document> {
        let state = self.state.read().expect("lock poisoned");
        if !state.docs.contains_key(&did) {
            return Err(BackendError::DocNotFound(did));
        }
        drop(state);

        debug!(%did, "opened in-memory document");
        let reader = MemoryReader {
            did,
            state: Arc::downgrade(&self.state),
        };
        Ok(Document::from_backend(did, Box::new(reader)))
    }

    fn doc_count(&self) -> u64 {
        self.state.read().expect("lock poisoned").docs.len() as u64
    }
}

impl std::fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("doc_count", &self.doc_count())
            .finish()
    }
}

/// Adapter bound to one in-memory document.
///
/// Holds a weak reference to the database state: the handle assumes the
/// database's lifetime, it does not extend it. After the database is
/// dropped every call fails with [`BackendError::DatabaseClosed`].
struct MemoryReader {
    did: DocId,
    state: Weak<RwLock<MemoryState>>,
}

impl MemoryReader {
    /// Run `f` against this reader's document under the read lock.
    fn with_doc<T>(&self, f: impl FnOnce(&StoredDoc) -> T) -> BackendResult<T> {
        let state = self.state.upgrade().ok_or(BackendError::DatabaseClosed)?;
        let guard = state.read().expect("lock poisoned");
        let doc = guard
            .docs
            .get(&self.did)
            .ok_or(BackendError::DocNotFound(self.did))?;
        Ok(f(doc))
    }
}

impl DocumentReader for MemoryReader {
    fn fetch_key(&self, keyid: KeyId) -> BackendResult<KeyValue> {
        self.with_doc(|doc| doc.keys.get(&keyid).cloned().unwrap_or_default())
    }

    fn fetch_all_keys(&self) -> BackendResult<KeyMap> {
        self.with_doc(|doc| doc.keys.clone())
    }

    fn fetch_data(&self) -> BackendResult<DocumentData> {
        self.with_doc(|doc| doc.data.clone())
    }

    fn open_term_list(&self) -> BackendResult<TermList> {
        // Entries are cloned out under the lock; the returned list owns
        // them and outlives both the guard and the database.
        self.with_doc(|doc| TermList::from_entries(doc.terms.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn keymap(pairs: &[(u32, &[u8])]) -> KeyMap {
        pairs
            .iter()
            .map(|(slot, bytes)| (KeyId::new(*slot), KeyValue::copy_from_slice(bytes)))
            .collect()
    }

    /// Database with the canonical test document: key 0 -> "abc", key 2
    /// explicitly empty.
    fn one_doc_db() -> (MemoryDatabase, DocId) {
        let db = MemoryDatabase::new();
        let did = db.add_document(
            keymap(&[(0, b"abc"), (2, b"")]),
            DocumentData::new(&b"payload bytes"[..]),
            vec![
                TermEntry::with_positions("quick", 1, vec![2]),
                TermEntry::with_positions("fox", 2, vec![4, 9]),
            ],
        );
        (db, did)
    }

    #[test]
    fn ids_are_sequential_from_first() {
        let db = MemoryDatabase::new();
        let d1 = db.add_document(KeyMap::new(), DocumentData::empty(), Vec::new());
        let d2 = db.add_document(KeyMap::new(), DocumentData::empty(), Vec::new());
        assert_eq!(d1, DocId::FIRST);
        assert_eq!(d2, DocId::FIRST.next());
        assert_eq!(db.doc_count(), 2);
    }

    #[test]
    fn open_missing_document_fails() {
        let db = MemoryDatabase::new();
        let err = db.open_document(DocId::new(99)).unwrap_err();
        assert!(matches!(err, BackendError::DocNotFound(did) if did == DocId::new(99)));
    }

    #[test]
    fn present_absent_and_explicit_empty_keys() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();

        assert_eq!(doc.get_key(KeyId::new(0)).unwrap().as_bytes(), b"abc");
        // Slot 1 was never stored; slot 2 was stored empty. Both read as
        // the empty value.
        assert!(doc.get_key(KeyId::new(1)).unwrap().is_empty());
        assert!(doc.get_key(KeyId::new(2)).unwrap().is_empty());
    }

    #[test]
    fn all_keys_lists_stored_slots_only() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();

        let all = doc.get_all_keys().unwrap();
        let slots: Vec<u32> = all.keys().map(|k| k.get()).collect();
        assert_eq!(slots, vec![0, 2]);
        for (keyid, value) in &all {
            assert_eq!(&doc.get_key(*keyid).unwrap(), value);
        }
    }

    #[test]
    fn data_roundtrips() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();
        assert_eq!(doc.get_data().unwrap().as_bytes(), b"payload bytes");
    }

    #[test]
    fn term_list_yields_stored_entries() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();

        let entries: Vec<TermEntry> = doc
            .open_term_list()
            .unwrap()
            .collect::<BackendResult<_>>()
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].term, "quick");
        assert_eq!(entries[1].positions, vec![4, 9]);
    }

    #[test]
    fn two_term_lists_do_not_interfere() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();

        let mut first = doc.open_term_list().unwrap();
        let second = doc.open_term_list().unwrap();

        while first.next().is_some() {}
        assert_eq!(second.count(), 2);
    }

    #[test]
    fn dropped_database_turns_calls_into_closed_errors() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();
        drop(db);

        assert!(matches!(
            doc.get_key(KeyId::new(0)).unwrap_err(),
            BackendError::DatabaseClosed
        ));
        assert!(matches!(
            doc.get_all_keys().unwrap_err(),
            BackendError::DatabaseClosed
        ));
        assert!(matches!(
            doc.get_data().unwrap_err(),
            BackendError::DatabaseClosed
        ));
        assert!(matches!(
            doc.open_term_list().unwrap_err(),
            BackendError::DatabaseClosed
        ));
    }

    #[test]
    fn term_list_opened_before_close_survives_it() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();
        let list = doc.open_term_list().unwrap();
        drop(db);

        // Ownership transferred at open time; the list already holds its
        // entries.
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn concurrent_reads_through_shared_handle() {
        let (db, did) = one_doc_db();
        let doc = db.open_document(did).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let doc = doc.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(doc.get_key(KeyId::new(0)).unwrap().as_bytes(), b"abc");
                        assert_eq!(doc.get_data().unwrap().as_bytes(), b"payload bytes");
                        let all = doc.get_all_keys().unwrap();
                        assert_eq!(all.len(), 2);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn handles_to_distinct_documents_are_independent() {
        let db = MemoryDatabase::new();
        let d1 = db.add_document(keymap(&[(0, b"one")]), DocumentData::empty(), Vec::new());
        let d2 = db.add_document(keymap(&[(0, b"two")]), DocumentData::empty(), Vec::new());

        let doc1 = db.open_document(d1).unwrap();
        let doc2 = db.open_document(d2).unwrap();
        assert_eq!(doc1.get_key(KeyId::new(0)).unwrap().as_bytes(), b"one");
        assert_eq!(doc2.get_key(KeyId::new(0)).unwrap().as_bytes(), b"two");
    }

    #[test]
    fn debug_reports_doc_count() {
        let (db, _) = one_doc_db();
        assert!(format!("{db:?}").contains("doc_count"));
    }
}
