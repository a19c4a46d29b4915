//! On-disk record framing.
//!
//! A segment file is a sequence of document records, ids implicit in file
//! order starting at [`DocId::FIRST`](quarry_types::DocId::FIRST):
//!
//! ```text
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized RecordPayload)]
//! ```
//!
//! The CRC is checked at read time, not at open time, so one corrupt
//! record fails only reads of that document while the rest of the segment
//! stays serviceable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quarry_doc::error::{BackendError, BackendResult};
use quarry_types::{DocId, DocumentData, KeyId, KeyMap, KeyValue, TermEntry};

/// Header size: 4 bytes length + 4 bytes CRC.
pub(crate) const HEADER_SIZE: usize = 8;

/// Serialized form of one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecordPayload {
    pub keys: BTreeMap<u32, Vec<u8>>,
    pub data: Vec<u8>,
    pub terms: Vec<TermEntry>,
}

impl RecordPayload {
    pub fn from_parts(keys: KeyMap, data: DocumentData, terms: Vec<TermEntry>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|(keyid, value)| (keyid.get(), value.as_bytes().to_vec()))
                .collect(),
            data: data.as_bytes().to_vec(),
            terms,
        }
    }

    pub fn key(&self, keyid: KeyId) -> KeyValue {
        self.keys
            .get(&keyid.get())
            .map(|bytes| KeyValue::copy_from_slice(bytes))
            .unwrap_or_default()
    }

    pub fn key_map(&self) -> KeyMap {
        self.keys
            .iter()
            .map(|(slot, bytes)| (KeyId::new(*slot), KeyValue::copy_from_slice(bytes)))
            .collect()
    }

    pub fn document_data(&self) -> DocumentData {
        DocumentData::copy_from_slice(&self.data)
    }
}

/// Serialize a payload and frame it with length and CRC.
pub(crate) fn encode_record(payload: &RecordPayload) -> BackendResult<Vec<u8>> {
    let body =
        bincode::serialize(payload).map_err(|e| BackendError::Serialization(e.to_string()))?;
    let mut framed = Vec::with_capacity(HEADER_SIZE + body.len());
    framed.extend_from_slice(&(body.len() as u32).to_le_bytes());
    framed.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
    framed.extend_from_slice(&body);
    Ok(framed)
}

/// Verify a framed payload body against its expected CRC and decode it.
pub(crate) fn decode_record(
    did: DocId,
    expected_crc: u32,
    body: &[u8],
) -> BackendResult<RecordPayload> {
    let actual_crc = crc32fast::hash(body);
    if actual_crc != expected_crc {
        return Err(BackendError::CorruptRecord {
            did,
            reason: format!("checksum mismatch: expected {expected_crc:08x}, got {actual_crc:08x}"),
        });
    }
    bincode::deserialize(body).map_err(|e| BackendError::CorruptRecord {
        did,
        reason: format!("undecodable payload: {e}"),
    })
}
