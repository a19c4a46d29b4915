use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use quarry_doc::error::BackendResult;
use quarry_types::{DocId, DocumentData, KeyMap, TermEntry};

use crate::format::{encode_record, RecordPayload};

/// Bulk-load writer for a record segment file.
///
/// Appends one framed record per document and assigns ids in file order,
/// starting at [`DocId::FIRST`]. This is the population path for
/// [`RecordDatabase`](crate::RecordDatabase); it is not part of the core
/// read contract, and a segment is only readable after [`finish`] has made
/// it durable.
///
/// [`finish`]: RecordStoreBuilder::finish
pub struct RecordStoreBuilder {
    path: PathBuf,
    writer: BufWriter<File>,
    next_id: DocId,
}

impl RecordStoreBuilder {
    /// Create a new segment file, truncating any existing file at `path`.
    pub fn create(path: &Path) -> BackendResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_id: DocId::FIRST,
        })
    }

    /// Append one document and return its assigned id.
    pub fn add_document(
        &mut self,
        keys: KeyMap,
        data: DocumentData,
        terms: Vec<TermEntry>,
    ) -> BackendResult<DocId> {
        let did = self.next_id;
        let payload = RecordPayload::from_parts(keys, data, terms);
        let framed = encode_record(&payload)?;
        self.writer.write_all(&framed)?;
        debug!(%did, len = framed.len(), "record appended");
        self.next_id = did.next();
        Ok(did)
    }

    /// Number of documents written so far.
    pub fn doc_count(&self) -> u64 {
        (self.next_id.get() - DocId::FIRST.get()) as u64
    }

    /// Flush and sync the segment, making it durable and readable.
    pub fn finish(mut self) -> BackendResult<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        debug!(path = %self.path.display(), docs = self.doc_count(), "segment finished");
        Ok(())
    }
}
