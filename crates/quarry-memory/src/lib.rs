//! In-memory document backend for Quarry.
//!
//! [`MemoryDatabase`] keeps whole documents in process-resident maps behind
//! a `RwLock`: no I/O latency, no persistence. Intended for tests and for
//! embedding small corpora.
//!
//! Handles minted here hold only a weak reference to the database state, so
//! a handle never keeps a dropped database alive; calls through such a
//! handle fail with `BackendError::DatabaseClosed` rather than reading
//! stale data.

pub mod database;

pub use database::MemoryDatabase;
