//! Document retrieval core for Quarry.
//!
//! This crate is the seam between storage backends and everything that
//! reads documents. It provides:
//! - The [`Document`] handle: shared, reference-counted access to one
//!   stored document's keys, payload, and term occurrences
//! - The [`DocumentReader`] trait every backend adapter implements
//! - The [`Database`] factory boundary that mints handles by document id
//! - The [`TermList`] forward-only term-occurrence iterator
//! - The [`BackendError`] taxonomy separating lifetime violations from
//!   catchable retrieval failures
//!
//! Backends differ radically in how they hold bytes — process-resident
//! maps, on-disk record files, remote services — but every one presents
//! this identical read contract, so match and ranking code is written once.

pub mod document;
pub mod error;
pub mod termlist;
pub mod traits;

pub use document::Document;
pub use error::{BackendError, BackendResult};
pub use termlist::TermList;
pub use traits::{Database, DocumentReader};
