use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

use crate::id::KeyId;

/// Value of one fast-access key on a document.
///
/// Backed by [`Bytes`], so cloning a value or sharing it across consumers
/// never copies the underlying bytes. A key that is not present on a
/// document is represented as a zero-length value, never as an error;
/// absence and an explicitly stored empty value are indistinguishable at
/// this layer.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyValue(Bytes);

impl KeyValue {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The zero-length value, also the result for any absent key.
    pub const fn empty() -> Self {
        Self(Bytes::new())
    }

    /// Copy a borrowed slice into a new value.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying shared buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyValue({:?})", self.0)
    }
}

impl From<Vec<u8>> for KeyValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for KeyValue {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

impl AsRef<[u8]> for KeyValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// All keys present on a document.
///
/// Contains only the [`KeyId`]s actually stored; the map type enforces the
/// one-value-per-slot invariant. Produced fresh on each request, never
/// cached by a document handle.
pub type KeyMap = BTreeMap<KeyId, KeyValue>;

/// Opaque bulk payload of a document.
///
/// Fetching this can be expensive (backend I/O, decompression); match and
/// ranking loops should prefer keys. Like [`KeyValue`], clones share the
/// underlying buffer.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DocumentData(Bytes);

impl DocumentData {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub const fn empty() -> Self {
        Self(Bytes::new())
    }

    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl fmt::Debug for DocumentData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentData({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for DocumentData {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for DocumentData {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

impl AsRef<[u8]> for DocumentData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
