//! File-backed document backend for Quarry.
//!
//! A [`RecordDatabase`] serves documents out of a single segment file of
//! length-prefixed, CRC32-checked, bincode-serialized records, one per
//! document, ids implicit in file order. [`RecordStoreBuilder`] is the
//! bulk-load path that writes such a segment.
//!
//! Reads are deliberately lazy: the slot table is built once at open, but
//! each fetch through a handle seeks, re-reads, and checks the record, so
//! corruption surfaces as a per-document `CorruptRecord` failure instead of
//! poisoning the whole database.

pub mod builder;
pub mod database;
mod format;

pub use builder::RecordStoreBuilder;
pub use database::RecordDatabase;
