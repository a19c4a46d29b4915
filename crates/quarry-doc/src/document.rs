use std::fmt;
use std::sync::Arc;

use quarry_types::{DocId, DocumentData, KeyId, KeyMap, KeyValue};
use tracing::debug;

use crate::error::BackendResult;
use crate::termlist::TermList;
use crate::traits::DocumentReader;

/// Shared handle to one stored document.
///
/// A handle pairs an immutable [`DocId`] with the backend adapter that can
/// materialize the document's content. It is the only way consumers touch a
/// document: match and ranking code receives handles from a
/// [`Database`](crate::traits::Database), shares them by cloning, and
/// queries them through the uniform contract below.
///
/// Cloning takes another reference to the same underlying record; the
/// document is never value-copied. Reference bookkeeping is a lock-free
/// atomic, independent of any backend lock, so one consumer blocking on
/// backend I/O never stalls another's clone or drop. When the last clone is
/// dropped the adapter is dropped with it, releasing whatever backend
/// resources it held, exactly once.
///
/// Nothing here is cached: every call reflects the backend's current view
/// within the scope of that one call. Layers above are free to cache.
pub struct Document {
    inner: Arc<DocumentInner>,
}

struct DocumentInner {
    did: DocId,
    reader: Box<dyn DocumentReader>,
}

impl Document {
    /// Mint a new handle around a backend adapter.
    ///
    /// Backend-internal: only a database (or its adapter crate) constructs
    /// handles. General code receives, clones, and queries them, never
    /// fabricates one from a raw id.
    pub fn from_backend(did: DocId, reader: Box<dyn DocumentReader>) -> Self {
        Self {
            inner: Arc::new(DocumentInner { did, reader }),
        }
    }

    /// The document's id, immutable for the life of the handle.
    pub fn id(&self) -> DocId {
        self.inner.did
    }

    /// Get one key by slot number.
    ///
    /// Keys are the quickly accessible fields meant for use inside match
    /// operations. An absent slot reads as the empty value; that is a
    /// normal result, not a failure.
    pub fn get_key(&self, keyid: KeyId) -> BackendResult<KeyValue> {
        self.inner.reader.fetch_key(keyid)
    }

    /// Get every key stored on the document.
    ///
    /// Materializes a full, fresh copy on each call; no ordering guarantee
    /// beyond being stable within the one returned map.
    pub fn get_all_keys(&self) -> BackendResult<KeyMap> {
        self.inner.reader.fetch_all_keys()
    }

    /// Get the document's bulk payload.
    ///
    /// This can be expensive (backend I/O, decompression) and should not be
    /// called from match loops; prefer a key for anything read per
    /// candidate.
    pub fn get_data(&self) -> BackendResult<DocumentData> {
        debug!(did = %self.inner.did, "fetching document data");
        self.inner.reader.fetch_data()
    }

    /// Open a fresh term list over the document's term occurrences.
    ///
    /// Ownership of the list transfers to the caller. Each call yields an
    /// independent iterator; simultaneous lists on one handle do not
    /// interfere.
    pub fn open_term_list(&self) -> BackendResult<TermList> {
        self.inner.reader.open_term_list()
    }

    /// Number of live handles sharing this document record.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl Clone for Document {
    /// Take another reference to the same document record.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("did", &self.inner.did)
            .field("handles", &self.handle_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use quarry_types::TermEntry;

    use super::*;

    /// Fixed-content reader that counts how many times it is released.
    struct StubReader {
        keys: KeyMap,
        data: DocumentData,
        terms: Vec<TermEntry>,
        releases: Arc<AtomicUsize>,
    }

    impl StubReader {
        fn new(releases: Arc<AtomicUsize>) -> Self {
            let mut keys = KeyMap::new();
            keys.insert(KeyId::new(0), KeyValue::new(&b"abc"[..]));
            keys.insert(KeyId::new(2), KeyValue::empty());
            Self {
                keys,
                data: DocumentData::new(&b"record body"[..]),
                terms: vec![TermEntry::new("alpha", 1), TermEntry::new("beta", 2)],
                releases,
            }
        }
    }

    impl DocumentReader for StubReader {
        fn fetch_key(&self, keyid: KeyId) -> BackendResult<KeyValue> {
            Ok(self.keys.get(&keyid).cloned().unwrap_or_default())
        }

        fn fetch_all_keys(&self) -> BackendResult<KeyMap> {
            Ok(self.keys.clone())
        }

        fn fetch_data(&self) -> BackendResult<DocumentData> {
            Ok(self.data.clone())
        }

        fn open_term_list(&self) -> BackendResult<TermList> {
            Ok(TermList::from_entries(self.terms.clone()))
        }
    }

    impl Drop for StubReader {
        fn drop(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn stub_document(releases: &Arc<AtomicUsize>) -> Document {
        Document::from_backend(DocId::new(7), Box::new(StubReader::new(Arc::clone(releases))))
    }

    #[test]
    fn absent_key_reads_empty_not_error() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);
        let value = doc.get_key(KeyId::new(1)).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn stored_empty_key_matches_absent_key() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);
        assert_eq!(doc.get_key(KeyId::new(0)).unwrap().as_bytes(), b"abc");
        // Slot 1 absent, slot 2 explicitly empty: indistinguishable.
        assert_eq!(
            doc.get_key(KeyId::new(1)).unwrap(),
            doc.get_key(KeyId::new(2)).unwrap()
        );
    }

    #[test]
    fn all_keys_agree_with_individual_gets() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);
        let all = doc.get_all_keys().unwrap();
        assert_eq!(all.len(), 2);
        for (keyid, value) in &all {
            assert_eq!(&doc.get_key(*keyid).unwrap(), value);
        }
    }

    #[test]
    fn id_is_stable_across_clones() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);
        let clone = doc.clone();
        assert_eq!(doc.id(), DocId::new(7));
        assert_eq!(clone.id(), doc.id());
    }

    #[test]
    fn reader_released_exactly_once_after_last_drop() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);

        let clones: Vec<Document> = (0..5).map(|_| doc.clone()).collect();
        assert_eq!(doc.handle_count(), 6);

        drop(clones);
        assert_eq!(releases.load(Ordering::SeqCst), 0, "released too early");
        assert_eq!(doc.handle_count(), 1);

        drop(doc);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_dropped_across_threads_release_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let doc = doc.clone();
                thread::spawn(move || {
                    // Each thread does a read, then drops its clone.
                    assert_eq!(doc.get_key(KeyId::new(0)).unwrap().as_bytes(), b"abc");
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        assert_eq!(releases.load(Ordering::SeqCst), 0);
        drop(doc);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn term_lists_are_independent() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);

        let mut first = doc.open_term_list().unwrap();
        let mut second = doc.open_term_list().unwrap();

        // Exhaust the first list entirely.
        assert_eq!(first.next().unwrap().unwrap().term, "alpha");
        assert_eq!(first.next().unwrap().unwrap().term, "beta");
        assert!(first.next().is_none());

        // The second still starts from the beginning.
        assert_eq!(second.next().unwrap().unwrap().term, "alpha");
    }

    #[test]
    fn get_data_returns_payload() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);
        assert_eq!(doc.get_data().unwrap().as_bytes(), b"record body");
    }

    #[test]
    fn debug_shows_id_and_handle_count() {
        let releases = Arc::new(AtomicUsize::new(0));
        let doc = stub_document(&releases);
        let debug = format!("{doc:?}");
        assert!(debug.contains("DocId(7)"));
        assert!(debug.contains("handles"));
    }
}
