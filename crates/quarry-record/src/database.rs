use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, warn};

use quarry_doc::error::{BackendError, BackendResult};
use quarry_doc::termlist::TermList;
use quarry_doc::traits::{Database, DocumentReader};
use quarry_doc::Document;
use quarry_types::{DocId, DocumentData, KeyId, KeyMap, KeyValue};

use crate::format::{decode_record, RecordPayload, HEADER_SIZE};

/// Location of one record in the segment file.
#[derive(Clone, Copy)]
struct RecordSlot {
    /// Byte offset of the record header.
    offset: u64,
    /// Payload length from the header.
    len: u32,
}

struct RecordInner {
    path: PathBuf,
    /// Shared read handle; seeks are per-call under the mutex. The segment
    /// is immutable after open, so every read observes the same state.
    file: Mutex<File>,
    /// Slot table indexed by `did - FIRST`, built once at open.
    slots: Vec<RecordSlot>,
}

impl RecordInner {
    fn slot(&self, did: DocId) -> BackendResult<RecordSlot> {
        let index = did
            .get()
            .checked_sub(DocId::FIRST.get())
            .ok_or(BackendError::DocNotFound(did))? as usize;
        self.slots
            .get(index)
            .copied()
            .ok_or(BackendError::DocNotFound(did))
    }

    /// Seek to a document's record, verify it, and decode it.
    fn read_payload(&self, did: DocId) -> BackendResult<RecordPayload> {
        let slot = self.slot(did)?;

        let mut header = [0u8; HEADER_SIZE];
        let mut body = vec![0u8; slot.len as usize];
        {
            let mut file = self.file.lock().expect("file mutex poisoned");
            file.seek(SeekFrom::Start(slot.offset))?;
            file.read_exact(&mut header)?;
            file.read_exact(&mut body)?;
        }

        let length = u32::from_le_bytes(header[0..4].try_into().expect("header slice"));
        if length != slot.len {
            return Err(BackendError::CorruptRecord {
                did,
                reason: format!("length frame changed: expected {}, got {length}", slot.len),
            });
        }
        let expected_crc = u32::from_le_bytes(header[4..8].try_into().expect("header slice"));
        decode_record(did, expected_crc, &body)
    }
}

/// File-backed document database over one record segment.
///
/// The segment is scanned front-to-back at open to build the slot table;
/// record contents are verified and decoded lazily, per read, so one
/// corrupt record fails only that document. A segment truncated mid-record
/// (an unfinished build) opens with the complete prefix of records.
pub struct RecordDatabase {
    inner: Arc<RecordInner>,
}

impl RecordDatabase {
    /// Open a segment file written by
    /// [`RecordStoreBuilder`](crate::RecordStoreBuilder).
    pub fn open(path: &Path) -> BackendResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let file_len = reader.get_ref().metadata()?.len();
        let mut slots = Vec::new();
        let mut offset: u64 = 0;

        while offset + HEADER_SIZE as u64 <= file_len {
            let mut header = [0u8; HEADER_SIZE];
            match reader.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(header[0..4].try_into().expect("header slice"));
            if offset + HEADER_SIZE as u64 + len as u64 > file_len {
                warn!(
                    offset,
                    len, file_len, "truncated record at segment tail; stopping scan"
                );
                break;
            }

            slots.push(RecordSlot { offset, len });
            offset += (HEADER_SIZE + len as usize) as u64;
            reader.seek(SeekFrom::Start(offset))?;
        }

        debug!(path = %path.display(), docs = slots.len(), "record segment opened");
        Ok(Self {
            inner: Arc::new(RecordInner {
                path: path.to_path_buf(),
                file: Mutex::new(File::open(path)?),
                slots,
            }),
        })
    }

    /// Path of the underlying segment file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

impl Database for RecordDatabase {
    fn open_document(&self, did: DocId) -> BackendResult<Document> {
        // Validate the id now so a bad open fails fast, at the factory.
        self.inner.slot(did)?;
        let reader = RecordReader {
            did,
            inner: Arc::downgrade(&self.inner),
        };
        Ok(Document::from_backend(did, Box::new(reader)))
    }

    fn doc_count(&self) -> u64 {
        self.inner.slots.len() as u64
    }
}

impl std::fmt::Debug for RecordDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDatabase")
            .field("path", &self.inner.path)
            .field("doc_count", &self.doc_count())
            .finish()
    }
}

/// Adapter bound to one on-disk document.
///
/// Every fetch seeks, re-reads, and decodes the whole record; there is no
/// caching at this layer, which is exactly the "data is expensive" case
/// the handle contract warns about. Holds only a weak reference to the
/// database, so calls after the database is dropped fail with
/// [`BackendError::DatabaseClosed`].
struct RecordReader {
    did: DocId,
    inner: Weak<RecordInner>,
}

impl RecordReader {
    fn load(&self) -> BackendResult<RecordPayload> {
        let inner = self.inner.upgrade().ok_or(BackendError::DatabaseClosed)?;
        inner.read_payload(self.did)
    }
}

impl DocumentReader for RecordReader {
    fn fetch_key(&self, keyid: KeyId) -> BackendResult<KeyValue> {
        Ok(self.load()?.key(keyid))
    }

    fn fetch_all_keys(&self) -> BackendResult<KeyMap> {
        Ok(self.load()?.key_map())
    }

    fn fetch_data(&self) -> BackendResult<DocumentData> {
        Ok(self.load()?.document_data())
    }

    fn open_term_list(&self) -> BackendResult<TermList> {
        Ok(TermList::from_entries(self.load()?.terms))
    }
}
