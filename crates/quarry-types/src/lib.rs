//! Foundation types for the Quarry document core.
//!
//! This crate provides the value types shared by every Quarry crate: the
//! identifiers a database hands out, the byte values a document exposes, and
//! the term-occurrence records its term list yields.
//!
//! # Key Types
//!
//! - [`DocId`] — Document identifier, unique within one database
//! - [`KeyId`] — Slot number of a fast-access key on a document
//! - [`KeyValue`] — Immutable key bytes; a missing key is an empty value
//! - [`KeyMap`] — All keys present on a document, one value per [`KeyId`]
//! - [`DocumentData`] — Opaque bulk payload of a document
//! - [`TermEntry`] — One term occurrence with frequency and positions

pub mod id;
pub mod term;
pub mod value;

pub use id::{DocId, KeyId};
pub use term::TermEntry;
pub use value::{DocumentData, KeyMap, KeyValue};
