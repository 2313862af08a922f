//! Storage abstraction for the occurrence collection.
//!
//! The whole collection is read and written as one unit; the domain layer
//! never asks the store for partial reads or per-record writes. This keeps
//! the store interchangeable (JSON file today, anything blob-shaped
//! tomorrow) and keeps persistence a side effect of a successful in-memory
//! mutation, not a participant in it.

use anyhow::Result;
use shared::Occurrence;

pub trait OccurrenceStore: Send + Sync {
    /// Read the stored collection. `Ok(None)` means nothing has been stored
    /// yet (the caller seeds); an `Err` means the blob exists but could not
    /// be read or parsed.
    fn load_all(&self) -> Result<Option<Vec<Occurrence>>>;

    /// Replace the stored collection with `occurrences`. Must be atomic:
    /// a failed write may not leave a half-written blob behind.
    fn save_all(&self, occurrences: &[Occurrence]) -> Result<()>;
}
